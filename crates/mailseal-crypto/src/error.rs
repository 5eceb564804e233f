//! Error types for mailseal cryptographic operations

use thiserror::Error;

/// Errors from key agreement, envelope handling, identifiers and digests.
///
/// Every failure is returned to the caller. Nothing in this crate logs an
/// error and carries on, and no failure is ever turned into an empty or
/// partial plaintext.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material has the wrong length or produced a degenerate exchange
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// What was wrong with the key
        reason: String,
    },

    /// The envelope's authentication tag did not verify
    ///
    /// Caused by a tampered ciphertext, a corrupted nonce or the wrong secret.
    #[error("authentication failed: envelope was not sealed with this secret or was modified")]
    AuthenticationFailure,

    /// The envelope text is not a structurally valid container
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope {
        /// Why the envelope was rejected
        reason: String,
    },

    /// The message could not be converted to JSON
    #[error("serialization failed: {reason}")]
    Serialization {
        /// Underlying serializer message
        reason: String,
    },

    /// Decrypted bytes are not valid JSON for the requested type
    #[error("deserialization failed: {reason}")]
    Deserialization {
        /// Underlying deserializer message
        reason: String,
    },

    /// A parameter is out of range (zero identifier length, bad alphabet)
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Which argument was rejected and why
        reason: String,
    },

    /// The requested hash algorithm is not supported
    #[error("unsupported hash algorithm: {name}")]
    UnsupportedAlgorithm {
        /// Name as given by the caller
        name: String,
    },

    /// The requested digest text encoding is not supported
    #[error("unsupported digest encoding: {name}")]
    UnsupportedEncoding {
        /// Name as given by the caller
        name: String,
    },

    /// The random source could not produce bytes
    #[error("random source failure: {reason}")]
    Entropy {
        /// Error reported by the random source
        reason: String,
    },
}

impl CryptoError {
    /// Shorthand for a key length mismatch.
    pub(crate) fn key_length(what: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidKey { reason: format!("{what} must be {expected} bytes, got {actual}") }
    }

    /// Returns true if the error means untrusted input was rejected.
    ///
    /// Integrity failures come from data the caller received from elsewhere
    /// and should be treated as possible tampering. All other variants are
    /// caller or environment errors.
    pub fn is_integrity_failure(&self) -> bool {
        match self {
            Self::AuthenticationFailure | Self::MalformedEnvelope { .. } => true,

            Self::InvalidKey { .. }
            | Self::Serialization { .. }
            | Self::Deserialization { .. }
            | Self::InvalidArgument { .. }
            | Self::UnsupportedAlgorithm { .. }
            | Self::UnsupportedEncoding { .. }
            | Self::Entropy { .. } => false,
        }
    }
}
