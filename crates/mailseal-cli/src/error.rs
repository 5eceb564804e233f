//! CLI error types.

use std::path::PathBuf;

use mailseal_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Library operation failed (bad key, tampered envelope, etc.).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Standard input or output failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Input was expected to be JSON but is not.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// True if the input was rejected as untrustworthy rather than misused.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Crypto(err) if err.is_integrity_failure())
    }
}
