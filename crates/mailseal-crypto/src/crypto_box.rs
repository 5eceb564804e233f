//! Public-key authenticated encryption of structured messages.

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    envelope::{NONCE_SIZE, decode_envelope, encode_envelope, open_envelope, seal_with_nonce},
    error::CryptoError,
    keys::{KeyPair, PublicKey, SecretKey, SharedSecret},
    random::{OsRandom, RandomSource},
    value::Value,
};

/// Key generation, key agreement and message sealing.
///
/// Holds nothing but its random source: keys and secrets are owned by the
/// caller and passed in per call, so one `CryptoBox` can serve any number of
/// peers and threads.
///
/// # Examples
///
/// ```
/// use mailseal_crypto::{CryptoBox, Value};
///
/// let crypto = CryptoBox::new();
/// let alice = crypto.generate_keypair()?;
/// let bob = crypto.generate_keypair()?;
///
/// let to_bob = crypto.compute_secret(&bob.public, &alice.secret)?;
/// let from_alice = crypto.compute_secret(&alice.public, &bob.secret)?;
///
/// let message = Value::map([("subject", Value::from("hi")), ("body", Value::from("hello"))]);
/// let envelope = crypto.encrypt_message(&to_bob, &message)?;
/// let opened: Value = crypto.decrypt_message(&from_alice, &envelope)?;
///
/// assert_eq!(opened, message);
/// # Ok::<(), mailseal_crypto::CryptoError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CryptoBox<R = OsRandom> {
    rng: R,
}

impl CryptoBox<OsRandom> {
    /// Box backed by the OS random source.
    pub fn new() -> Self {
        Self { rng: OsRandom }
    }
}

impl<R: RandomSource> CryptoBox<R> {
    /// Box drawing randomness from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a fresh key pair.
    pub fn generate_keypair(&self) -> Result<KeyPair, CryptoError> {
        KeyPair::generate(&self.rng)
    }

    /// Derive the secret shared with the owner of `peer_public`.
    pub fn compute_secret(
        &self,
        peer_public: &PublicKey,
        own_secret: &SecretKey,
    ) -> Result<SharedSecret, CryptoError> {
        crate::keys::compute_secret(peer_public, own_secret)
    }

    /// Serialize `message` to JSON and seal it under `secret` with a fresh
    /// random nonce.
    ///
    /// # Errors
    ///
    /// - `Serialization`: the message has no JSON form
    /// - `Entropy`: the random source failed
    pub fn encrypt_message<T: Serialize + ?Sized>(
        &self,
        secret: &SharedSecret,
        message: &T,
    ) -> Result<String, CryptoError> {
        let plaintext = serde_json::to_vec(message)
            .map_err(|e| CryptoError::Serialization { reason: e.to_string() })?;

        let mut nonce = [0u8; NONCE_SIZE];
        self.rng.fill_bytes(&mut nonce)?;

        let envelope = seal_with_nonce(secret, &nonce, &plaintext);
        tracing::trace!(plaintext_len = plaintext.len(), envelope_len = envelope.len(), "sealed message");

        Ok(encode_envelope(&envelope))
    }

    /// Open an envelope produced by [`Self::encrypt_message`] and parse the
    /// JSON inside it.
    ///
    /// # Errors
    ///
    /// - `MalformedEnvelope`: not base64, or shorter than a nonce
    /// - `AuthenticationFailure`: sealed under another secret, or modified
    /// - `Deserialization`: authentic bytes that are not valid JSON for `T`
    pub fn decrypt_message<T: DeserializeOwned>(
        &self,
        secret: &SharedSecret,
        envelope: &str,
    ) -> Result<T, CryptoError> {
        let envelope = decode_envelope(envelope)?;
        let plaintext = open_envelope(secret, &envelope)?;
        tracing::trace!(plaintext_len = plaintext.len(), "opened envelope");

        serde_json::from_slice(&plaintext)
            .map_err(|e| CryptoError::Deserialization { reason: e.to_string() })
    }
}

/// Generate a key pair from the OS random source.
pub fn generate_keypair() -> Result<KeyPair, CryptoError> {
    CryptoBox::new().generate_keypair()
}

/// Seal a [`Value`] under `secret` using the OS random source.
pub fn encrypt_message(secret: &SharedSecret, message: &Value) -> Result<String, CryptoError> {
    CryptoBox::new().encrypt_message(secret, message)
}

/// Open an envelope into a [`Value`].
pub fn decrypt_message(secret: &SharedSecret, envelope: &str) -> Result<Value, CryptoError> {
    CryptoBox::new().decrypt_message(secret, envelope)
}
