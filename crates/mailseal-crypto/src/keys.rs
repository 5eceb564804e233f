//! X25519 key pairs and shared secret derivation
//!
//! Shared secrets are the NaCl `crypto_box_beforenm` key: the X25519
//! Diffie-Hellman output run through HSalsa20 with an all-zero input block.
//! Both sides of an exchange arrive at the same 32-byte key for the envelope
//! cipher, and keys exchanged with other NaCl implementations agree.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use salsa20::{Key as SalsaKey, cipher::consts::U10, hsalsa};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

use crate::{error::CryptoError, random::RandomSource};

/// Size of an X25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Size of an X25519 secret key in bytes
pub const SECRET_KEY_SIZE: usize = 32;
/// Size of a derived shared secret in bytes
pub const SHARED_SECRET_SIZE: usize = 32;

/// Public half of a key pair. Safe to publish.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(X25519PublicKey);

impl PublicKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        self.0.as_bytes()
    }

    /// Standard padded base64 of the key bytes.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.as_bytes())
    }

    /// Parse a key from standard base64.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64.decode(encoded.trim()).map_err(|e| CryptoError::InvalidKey {
            reason: format!("public key is not valid base64: {e}"),
        })?;
        Self::try_from(bytes.as_slice())
    }
}

impl From<[u8; PUBLIC_KEY_SIZE]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(X25519PublicKey::from(bytes))
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let Ok(array) = <[u8; PUBLIC_KEY_SIZE]>::try_from(bytes) else {
            return Err(CryptoError::key_length("public key", PUBLIC_KEY_SIZE, bytes.len()));
        };
        Ok(Self::from(array))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_base64()).finish()
    }
}

/// Secret half of a key pair.
///
/// Zeroized on drop. There is deliberately no serde support: exporting the
/// key requires an explicit [`SecretKey::to_bytes`] or
/// [`SecretKey::to_base64`] call.
#[derive(Clone)]
pub struct SecretKey(StaticSecret);

impl SecretKey {
    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(X25519PublicKey::from(&self.0))
    }

    /// Copy of the raw key bytes, zeroized when dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_SIZE]> {
        Zeroizing::new(self.0.to_bytes())
    }

    /// Standard padded base64 of the key bytes, zeroized when dropped.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(self.0.as_bytes()))
    }

    /// Parse a key from standard base64.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(BASE64.decode(encoded.trim()).map_err(|_| {
            CryptoError::InvalidKey { reason: "secret key is not valid base64".to_string() }
        })?);
        Self::try_from(bytes.as_slice())
    }
}

impl From<[u8; SECRET_KEY_SIZE]> for SecretKey {
    fn from(mut bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(bytes);
        bytes.zeroize();
        Self(secret)
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let Ok(array) = <[u8; SECRET_KEY_SIZE]>::try_from(bytes) else {
            return Err(CryptoError::key_length("secret key", SECRET_KEY_SIZE, bytes.len()));
        };
        Ok(Self::from(array))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// An X25519 identity: public key plus the secret key that owns it.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Key to hand out to peers
    pub public: PublicKey,
    /// Key that never leaves its holder
    pub secret: SecretKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the given random source.
    ///
    /// The 32 random bytes become an X25519 scalar; clamping is applied by
    /// the primitive, so every output is a valid non-degenerate key.
    pub fn generate<R: RandomSource + ?Sized>(rng: &R) -> Result<Self, CryptoError> {
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
        rng.fill_bytes(&mut *seed)?;

        let secret = SecretKey::from(*seed);
        let public = secret.public_key();

        Ok(Self { public, secret })
    }

    /// Rebuild a key pair from a stored secret key.
    pub fn from_secret(secret: SecretKey) -> Self {
        Self { public: secret.public_key(), secret }
    }
}

/// Symmetric key shared by the two parties of an exchange.
///
/// Zeroized on drop. Held only while the peer relationship is active.
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    /// Wrap secret bytes obtained elsewhere (e.g. from the caller's storage).
    pub fn from_bytes(bytes: [u8; SHARED_SECRET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }

    /// Standard padded base64 of the secret, zeroized when dropped.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(self.0))
    }

    /// Parse a secret from standard base64.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(BASE64.decode(encoded.trim()).map_err(|_| {
            CryptoError::InvalidKey { reason: "shared secret is not valid base64".to_string() }
        })?);
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<&[u8]> for SharedSecret {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let Ok(array) = <[u8; SHARED_SECRET_SIZE]>::try_from(bytes) else {
            return Err(CryptoError::key_length("shared secret", SHARED_SECRET_SIZE, bytes.len()));
        };
        Ok(Self(array))
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Derive the shared secret between `own_secret` and `peer_public`.
///
/// # Security
///
/// - Symmetric: `compute_secret(a.pub, b.sec) == compute_secret(b.pub, a.sec)`
/// - Deterministic: same inputs always produce the same secret
/// - Low-order peer points yield an all-zero exchange and are rejected
/// - Same output as NaCl `crypto_box_beforenm` for every accepted key
pub fn compute_secret(
    peer_public: &PublicKey,
    own_secret: &SecretKey,
) -> Result<SharedSecret, CryptoError> {
    let exchange = own_secret.0.diffie_hellman(&peer_public.0);
    if !exchange.was_contributory() {
        return Err(CryptoError::InvalidKey {
            reason: "peer public key is a low-order point".to_string(),
        });
    }

    // HSalsa20/20 (10 double rounds) over the zero block
    let mut key = hsalsa::<U10>(SalsaKey::from_slice(exchange.as_bytes()), &Default::default());
    let secret = SharedSecret(key.into());
    key.as_mut_slice().zeroize();

    Ok(secret)
}

/// [`compute_secret`] over raw byte slices.
///
/// Both inputs must be exactly 32 bytes; anything else fails with
/// [`CryptoError::InvalidKey`] rather than being truncated or padded.
pub fn compute_secret_from_bytes(
    peer_public: &[u8],
    own_secret: &[u8],
) -> Result<SharedSecret, CryptoError> {
    let peer_public = PublicKey::try_from(peer_public)?;
    let own_secret = SecretKey::try_from(own_secret)?;
    compute_secret(&peer_public, &own_secret)
}
