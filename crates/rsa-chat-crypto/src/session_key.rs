//! Symmetric session keys.
//!
//! A session key is 64 random bytes. It is only ever exposed by reference,
//! compared in constant time, and wiped when dropped.

use rand::{CryptoRng, RngCore};
use rsa_chat_common::helpers::constant_time_eq;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of every session key in bytes.
pub const SESSION_KEY_LEN: usize = 64;

/// Plaintext symmetric session key shared with one remote.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; SESSION_KEY_LEN]);

impl SessionKey {
    /// Draw a fresh key from `rng`.
    pub fn generate<R>(rng: &mut R) -> Result<Self, rand::Error>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let mut bytes = [0u8; SESSION_KEY_LEN];
        if let Err(e) = rng.try_fill_bytes(&mut bytes) {
            bytes.zeroize();
            return Err(e);
        }
        Ok(Self(bytes))
    }

    /// Build a key from exactly [`SESSION_KEY_LEN`] bytes.
    ///
    /// Returns `None` for any other length.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; SESSION_KEY_LEN] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_LEN] {
        &self.0
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}
