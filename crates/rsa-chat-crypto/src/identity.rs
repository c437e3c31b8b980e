//! Public key encoding and peer fingerprints.
//!
//! A **peer fingerprint** is the base64url-encoded SHA-256 digest of the
//! peer's PKCS#1 DER public key (32 bytes → 43 characters). It is a short,
//! stable handle for a public key that is easy to compare out of band.
//!
//! Public keys travel between peers as PKCS#1 PEM. [`PublicIdentity`] bundles
//! the PEM with the peer's chosen identifier for whatever transport the
//! caller uses.
//!
//! # Example
//!
//! ```no_run
//! use rsa_chat_crypto::{Peer, PeerFingerprint};
//!
//! let peer = Peer::new()?.with_id("jack");
//! let announcement = peer.public_identity()?;
//!
//! // On the receiving side
//! let public_key = announcement.public_key()?;
//! assert_eq!(PeerFingerprint::from_public_key(&public_key)?, announcement.fingerprint);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey, LineEnding};
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Digest length backing a fingerprint.
const FINGERPRINT_LEN: usize = 32;

/// Encode a public key as PKCS#1 PEM with LF line endings.
pub fn encode_public_key_pem(key: &RsaPublicKey) -> Result<String> {
    key.to_pkcs1_pem(LineEnding::LF)
        .context("failed to encode public key as PEM")
}

/// Decode a PKCS#1 PEM public key.
pub fn decode_public_key_pem(pem: &str) -> Result<RsaPublicKey> {
    RsaPublicKey::from_pkcs1_pem(pem).context("invalid PKCS#1 public key PEM")
}

/// Peer fingerprint: base64url-encoded SHA-256 of the PKCS#1 DER public key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerFingerprint(String);

impl PeerFingerprint {
    /// Fingerprint a public key.
    pub fn from_public_key(key: &RsaPublicKey) -> Result<Self> {
        let der = key
            .to_pkcs1_der()
            .context("failed to encode public key as DER")?;
        let digest = Sha256::digest(der.as_bytes());
        Ok(Self(URL_SAFE_NO_PAD.encode(digest)))
    }

    /// Parse a fingerprint from its string representation.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .context("invalid base64url encoding")?;

        if bytes.len() != FINGERPRINT_LEN {
            anyhow::bail!(
                "invalid fingerprint length: expected {} bytes, got {}",
                FINGERPRINT_LEN,
                bytes.len()
            );
        }

        Ok(Self(s.to_string()))
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PeerFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerFingerprint({})", self.0)
    }
}

/// What a peer hands to the transport so others can address it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicIdentity {
    /// Caller-chosen identifier of the peer.
    pub id: String,
    /// PKCS#1 PEM public key.
    pub public_key_pem: String,
    /// Fingerprint of `public_key_pem`.
    pub fingerprint: PeerFingerprint,
}

impl PublicIdentity {
    /// Build an identity record for `key`.
    pub fn new(id: impl Into<String>, key: &RsaPublicKey) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            public_key_pem: encode_public_key_pem(key)?,
            fingerprint: PeerFingerprint::from_public_key(key)?,
        })
    }

    /// Decode the public key and check it against the fingerprint.
    pub fn public_key(&self) -> Result<RsaPublicKey> {
        let key = decode_public_key_pem(&self.public_key_pem)?;
        if PeerFingerprint::from_public_key(&key)? != self.fingerprint {
            anyhow::bail!("public key does not match fingerprint for {}", self.id);
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use rsa::RsaPrivateKey;

    // Small modulus keeps these tests fast; nothing here depends on size.
    fn test_key(seed: u64) -> RsaPublicKey {
        let mut rng = StdRng::seed_from_u64(seed);
        RsaPrivateKey::new(&mut rng, 1024).unwrap().to_public_key()
    }

    #[test]
    fn test_pem_roundtrip() {
        let key = test_key(1);
        let pem = encode_public_key_pem(&key).unwrap();
        assert!(pem.starts_with("-----BEGIN RSA PUBLIC KEY-----"));

        let decoded = decode_public_key_pem(&pem).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_public_key_pem("not a key").is_err());
    }

    #[test]
    fn test_fingerprint_shape_and_stability() {
        let key = test_key(2);
        let a = PeerFingerprint::from_public_key(&key).unwrap();
        let b = PeerFingerprint::from_public_key(&key).unwrap();

        assert_eq!(a.as_str().len(), 43);
        assert_eq!(a, b);
        assert_ne!(a, PeerFingerprint::from_public_key(&test_key(3)).unwrap());
    }

    #[test]
    fn test_fingerprint_parse() {
        let fp = PeerFingerprint::from_public_key(&test_key(4)).unwrap();
        assert_eq!(PeerFingerprint::parse(fp.as_str()).unwrap(), fp);

        assert!(PeerFingerprint::parse("too-short").is_err());
        assert!(PeerFingerprint::parse("!!!not base64!!!").is_err());
    }

    #[test]
    fn test_public_identity_json() {
        let key = test_key(5);
        let identity = PublicIdentity::new("jill", &key).unwrap();

        let json = serde_json::to_string(&identity).unwrap();
        let parsed: PublicIdentity = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, identity);
        assert_eq!(parsed.public_key().unwrap(), key);
    }

    #[test]
    fn test_public_identity_detects_swapped_key() {
        let mut identity = PublicIdentity::new("jill", &test_key(6)).unwrap();
        identity.public_key_pem = encode_public_key_pem(&test_key(7)).unwrap();

        assert!(identity.public_key().is_err());
    }
}
