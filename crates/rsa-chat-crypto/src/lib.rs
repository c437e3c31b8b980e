//! Cryptographic primitives for rsa-chat.
//!
//! This crate provides:
//! - Long-lived RSA peer identities with stable public keys
//! - Session-key exchange by wrapping a random symmetric key under the
//!   recipient's public key (RSA-OAEP, SHA-256, label `session-key`)
//! - Per-remote caches of outgoing and incoming session keys
//! - Public key encoding and fingerprints for handing identities to a transport
//!
//! # Design
//!
//! A [`Peer`] generates one outgoing session key per remote identifier and
//! re-wraps that same key on every request, so the remote always recovers
//! identical key material even though the ciphertext changes with each call.
//! Incoming keys are decrypted fresh on every load and replace whatever was
//! stored for that remote.
//!
//! Transport of ciphertexts and public keys is the caller's job.

#![forbid(unsafe_code)]

pub mod entropy;
pub mod identity;
pub mod peer;
pub mod session_key;

pub use entropy::{EntropySource, SystemEntropy};
pub use identity::{PeerFingerprint, PublicIdentity};
pub use peer::{Peer, PeerConnection, PeerError, PRIVATE_KEY_BITS, SESSION_KEY_LABEL};
pub use rsa::RsaPublicKey;
pub use session_key::{SessionKey, SESSION_KEY_LEN};
