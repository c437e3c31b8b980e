//! Peers and session-key exchange.
//!
//! A [`Peer`] owns one RSA key pair for its whole lifetime and two caches of
//! [`PeerConnection`]s keyed by remote identifier:
//!
//! - **outgoing**: session keys this peer generated for a remote. Created once
//!   per identifier; every later request re-wraps the same key.
//! - **incoming**: session keys received from a remote. Replaced on every
//!   successful load.
//!
//! # Exchange
//!
//! ```text
//! jack                                         jill
//!  |  outgoing_cipher_session_key(jill_pk, "jill")  |
//!  |   - generate/reuse 64-byte key for "jill"      |
//!  |   - RSA-OAEP(SHA-256, "session-key") wrap      |
//!  |----------------- ciphertext, jack_pk --------->|
//!  |                 load_incoming_cipher_session_key(ct, jack_pk, "jack")
//!  |                   - unwrap with jill's private key
//!  |                   - store under "jack"
//! ```
//!
//! # Thread Safety
//!
//! `Peer` is `Send + Sync`. Each cache and the entropy source sit behind
//! their own mutex. The outgoing cache stays locked from lookup to insert,
//! so concurrent callers never generate two keys for one identifier.
//! Locks are always taken cache first, entropy second.

use rand::{CryptoRng, RngCore};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::entropy::{EntropySource, SystemEntropy};
use crate::identity::PublicIdentity;
use crate::session_key::SessionKey;

/// RSA modulus size for peer key pairs.
pub const PRIVATE_KEY_BITS: usize = 2048;

/// OAEP label binding ciphertexts to this exchange.
pub const SESSION_KEY_LABEL: &str = "session-key";

/// Session-key exchange errors.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("an identifier for the remote must be provided")]
    InvalidIdentifier,

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Carries no cause, whatever the failure was.
    #[error("decryption failed")]
    Decryption,
}

/// Session record for one remote in one direction.
#[derive(Clone, Debug)]
pub struct PeerConnection {
    remote_public_key: RsaPublicKey,
    session_key: SessionKey,
}

impl PeerConnection {
    fn new(remote_public_key: RsaPublicKey, session_key: SessionKey) -> Self {
        Self {
            remote_public_key,
            session_key,
        }
    }

    /// Remote public key captured when the session was established.
    pub fn remote_public_key(&self) -> &RsaPublicKey {
        &self.remote_public_key
    }

    /// Plaintext session key.
    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }
}

/// A named participant in session-key exchange.
pub struct Peer {
    id: String,
    entropy: Mutex<Box<dyn EntropySource>>,
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    outgoing: Mutex<HashMap<String, PeerConnection>>,
    incoming: Mutex<HashMap<String, PeerConnection>>,
}

impl Peer {
    /// Create a peer backed by the OS CSPRNG.
    pub fn new() -> Result<Self, PeerError> {
        Self::with_entropy(SystemEntropy::default())
    }

    /// Create a peer that draws all randomness from `entropy`.
    ///
    /// The key pair is generated here, from the same source.
    pub fn with_entropy(entropy: impl EntropySource + 'static) -> Result<Self, PeerError> {
        let mut entropy: Box<dyn EntropySource> = Box::new(entropy);

        let private_key = RsaPrivateKey::new(&mut entropy.as_mut(), PRIVATE_KEY_BITS)
            .map_err(|e| PeerError::KeyGeneration(e.to_string()))?;
        let public_key = private_key.to_public_key();

        info!(bits = PRIVATE_KEY_BITS, "generated peer key pair");

        Ok(Self {
            id: String::new(),
            entropy: Mutex::new(entropy),
            private_key,
            public_key,
            outgoing: Mutex::new(HashMap::new()),
            incoming: Mutex::new(HashMap::new()),
        })
    }

    /// Set the identifier and return the peer.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    /// Identifier assigned by the caller. Empty until set.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Assign the identifier. Uniqueness is the caller's concern.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Public half of this peer's key pair.
    pub fn public_key(&self) -> RsaPublicKey {
        self.public_key.clone()
    }

    /// Identity record for handing to a transport.
    pub fn public_identity(&self) -> anyhow::Result<PublicIdentity> {
        PublicIdentity::new(self.id.clone(), &self.public_key)
    }

    /// Wrap the session key for `dest_id` under the cached remote public key.
    ///
    /// The first call for an identifier generates the key and pins
    /// `dest_public_key`; later calls reuse both, ignoring any different key
    /// passed in. Every call returns fresh ciphertext.
    pub fn outgoing_cipher_session_key(
        &self,
        dest_public_key: &RsaPublicKey,
        dest_id: &str,
    ) -> Result<Vec<u8>, PeerError> {
        self.wrap_outgoing(None, dest_public_key, dest_id)
    }

    /// Like [`outgoing_cipher_session_key`](Self::outgoing_cipher_session_key),
    /// but a newly generated session key is drawn from `rng` instead of the
    /// peer's own source. OAEP padding still uses the peer's source.
    pub fn outgoing_cipher_session_key_with_rng<R>(
        &self,
        rng: &mut R,
        dest_public_key: &RsaPublicKey,
        dest_id: &str,
    ) -> Result<Vec<u8>, PeerError>
    where
        R: RngCore + CryptoRng,
    {
        self.wrap_outgoing(Some(rng as &mut dyn RngCoreCrypto), dest_public_key, dest_id)
    }

    fn wrap_outgoing(
        &self,
        rng: Option<&mut dyn RngCoreCrypto>,
        dest_public_key: &RsaPublicKey,
        dest_id: &str,
    ) -> Result<Vec<u8>, PeerError> {
        check_remote_id(dest_id)?;

        let session = {
            let mut outgoing = lock(&self.outgoing);
            match outgoing.get(dest_id) {
                Some(session) => {
                    if session.remote_public_key != *dest_public_key {
                        debug!(
                            remote = dest_id,
                            "ignoring new public key for existing outgoing session"
                        );
                    }
                    session.clone()
                }
                None => {
                    let generated = match rng {
                        Some(rng) => SessionKey::generate(rng),
                        None => {
                            let mut entropy = lock(&self.entropy);
                            SessionKey::generate(entropy.as_mut())
                        }
                    };
                    let session_key =
                        generated.map_err(|e| PeerError::KeyGeneration(e.to_string()))?;

                    let session = PeerConnection::new(dest_public_key.clone(), session_key);
                    outgoing.insert(dest_id.to_string(), session.clone());
                    debug!(remote = dest_id, "created outgoing session key");
                    session
                }
            }
        };

        let mut entropy = lock(&self.entropy);
        session
            .remote_public_key
            .encrypt(
                &mut entropy.as_mut(),
                oaep(),
                session.session_key.as_bytes(),
            )
            .map_err(|e| PeerError::Encryption(e.to_string()))
    }

    /// Unwrap a session key sent by `source_id` and store it, replacing any
    /// earlier key from that remote.
    ///
    /// All decryption failures, including a plaintext of the wrong length,
    /// surface as the same [`PeerError::Decryption`].
    pub fn load_incoming_cipher_session_key(
        &self,
        cipher_session_key: &[u8],
        source_public_key: &RsaPublicKey,
        source_id: &str,
    ) -> Result<(), PeerError> {
        check_remote_id(source_id)?;

        let session_key = {
            let mut entropy = lock(&self.entropy);
            self.private_key
                .decrypt_blinded(&mut entropy.as_mut(), oaep(), cipher_session_key)
                .ok()
                .and_then(|mut plaintext| {
                    let key = SessionKey::from_slice(&plaintext);
                    plaintext.zeroize();
                    key
                })
        };

        let Some(session_key) = session_key else {
            warn!(remote = source_id, "rejected incoming session key");
            return Err(PeerError::Decryption);
        };

        lock(&self.incoming).insert(
            source_id.to_string(),
            PeerConnection::new(source_public_key.clone(), session_key),
        );
        debug!(remote = source_id, "stored incoming session key");

        Ok(())
    }

    /// Cached outgoing session for `remote_id`.
    pub fn outgoing_session(&self, remote_id: &str) -> Option<PeerConnection> {
        lock(&self.outgoing).get(remote_id).cloned()
    }

    /// Most recently loaded incoming session for `remote_id`.
    pub fn incoming_session(&self, remote_id: &str) -> Option<PeerConnection> {
        lock(&self.incoming).get(remote_id).cloned()
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.id)
            .field("outgoing", &lock(&self.outgoing).len())
            .field("incoming", &lock(&self.incoming).len())
            .finish_non_exhaustive()
    }
}

/// Object-safe stand-in for `RngCore + CryptoRng` in the override path.
trait RngCoreCrypto: RngCore + CryptoRng {}

impl<T: RngCore + CryptoRng + ?Sized> RngCoreCrypto for T {}

fn oaep() -> Oaep {
    Oaep::new_with_label::<Sha256, _>(SESSION_KEY_LABEL)
}

fn check_remote_id(id: &str) -> Result<(), PeerError> {
    if id.is_empty() {
        warn!("rejected empty remote identifier");
        return Err(PeerError::InvalidIdentifier);
    }
    Ok(())
}

/// Each critical section does at most one `insert`, so a poisoned lock
/// never holds a half-updated map.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
