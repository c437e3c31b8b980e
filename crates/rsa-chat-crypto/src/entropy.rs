//! Entropy sources for peers.
//!
//! Every randomized operation a [`Peer`](crate::Peer) performs draws from an
//! [`EntropySource`] chosen at construction. The default is [`SystemEntropy`],
//! the operating system CSPRNG. Tests substitute a seeded generator:
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use rsa_chat_crypto::EntropySource;
//!
//! fn takes_source(_: impl EntropySource) {}
//! takes_source(StdRng::seed_from_u64(7));
//! ```

use rand::{CryptoRng, RngCore};

/// The OS CSPRNG.
pub type SystemEntropy = rand::rngs::OsRng;

/// A cryptographically secure random byte source a peer can own.
///
/// Blanket-implemented for every `RngCore + CryptoRng + Send` type, so
/// `OsRng`, `StdRng` and `ChaCha`-family generators all qualify.
pub trait EntropySource: RngCore + CryptoRng + Send {}

impl<T: RngCore + CryptoRng + Send> EntropySource for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a: Box<dyn EntropySource> = Box::new(StdRng::seed_from_u64(42));
        let mut b: Box<dyn EntropySource> = Box::new(StdRng::seed_from_u64(42));

        let mut left = [0u8; 32];
        let mut right = [0u8; 32];
        a.fill_bytes(&mut left);
        b.fill_bytes(&mut right);
        assert_eq!(left, right);
    }

    #[test]
    fn test_system_entropy_fills() {
        let mut source = SystemEntropy::default();
        let mut buf = [0u8; 64];
        source.try_fill_bytes(&mut buf).unwrap();
        assert_ne!(buf, [0u8; 64]);
    }
}
