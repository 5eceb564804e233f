//! Entropy sources.
//!
//! Key generation, nonces and identifiers all draw from a [`RandomSource`].
//! Production code uses [`OsRandom`]; tests plug in seeded sources so that
//! key pairs and envelopes are reproducible.

use crate::error::CryptoError;

/// Source of cryptographically secure random bytes.
///
/// # Invariants
///
/// - Production implementations MUST be backed by a CSPRNG
/// - A failure must be reported, never papered over with weak bytes
pub trait RandomSource {
    /// Fills the provided buffer with random bytes.
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError>;
}

/// Operating system CSPRNG (getrandom).
///
/// Uses `/dev/urandom`/`getrandom(2)` on Linux, `BCryptGenRandom` on
/// Windows and the platform equivalent elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
        getrandom::fill(buffer).map_err(|e| CryptoError::Entropy { reason: e.to_string() })
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &R {
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
        (**self).fill_bytes(buffer)
    }
}
