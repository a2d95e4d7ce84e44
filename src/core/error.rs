//! Error types for octree building, splitting and serialization

use thiserror::Error;

/// Main error type for the crate
///
/// `Config` covers bad input data and may be handled by skipping the
/// offending primitive. `Invariant`, `Format` and `FingerprintMismatch`
/// mean the octree or the stream is corrupt and must not be used.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Fingerprint mismatch: expected {expected:#018x}, found {found:#018x}")]
    FingerprintMismatch { expected: u64, found: u64 },
}

impl Error {
    /// True for errors that indicate corrupt data rather than bad input
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Invariant(_) | Error::Format(_) | Error::FingerprintMismatch { .. }
        )
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }
}
