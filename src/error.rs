//! Error types for archive operations.

use std::io;
use thiserror::Error;

/// The error type for everything that can go wrong while reading an archive.
#[derive(Debug, Error)]
pub enum ZipError {
    /// The bytes do not form a valid ZIP archive, or a record inside it is
    /// malformed. Always fatal to the operation that hit it; parsing is a
    /// single deterministic pass, so a retry over the same bytes cannot
    /// succeed.
    #[error("invalid ZIP archive: {0}")]
    Format(String),

    /// The archive is valid but uses a feature this reader does not handle
    /// (spanned volumes, encryption, an unknown compression method).
    #[error("unsupported ZIP feature: {0}")]
    Unsupported(String),

    /// The archive was closed before this call.
    #[error("ZIP archive is closed")]
    Closed,

    /// Passthrough from the underlying byte source. Not interpreted and not
    /// retried at this layer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ZipError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Wrap into an `io::Error` for use inside `std::io::Read` impls.
    pub(crate) fn into_io(self) -> io::Error {
        match self {
            Self::Io(e) => e,
            other => io::Error::other(other),
        }
    }
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ZipError>;
