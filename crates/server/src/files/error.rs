//! Error kinds surfaced by the file-access layer.

use thiserror::Error;

/// Errors that can occur while resolving or reading documents.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The path resolves outside the document root.
    #[error("path is outside the document root: {0}")]
    Containment(String),

    /// The path does not exist or is not the expected type.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reading failed for a reason other than the two above.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AccessError {
    /// Wire category for this error.
    pub fn kind(&self) -> protocol::ErrorKind {
        match self {
            AccessError::Containment(_) => protocol::ErrorKind::Containment,
            AccessError::NotFound(_) => protocol::ErrorKind::NotFound,
            AccessError::Io(_) => protocol::ErrorKind::Io,
        }
    }
}
