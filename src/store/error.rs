use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by document-store backends.
pub enum StoreError {
    /// The request never produced a response (connect failure, reset, client timeout).
    #[error("store request to '{collection}' failed: {message}")]
    RequestFailed {
        /// Collection being read.
        collection: String,
        /// Error message.
        message: String,
    },

    /// The store answered with a non-success status other than 404.
    #[error("store returned status {status} for '{collection}'")]
    UnexpectedStatus {
        /// Collection being read.
        collection: String,
        /// HTTP status code.
        status: u16,
    },

    /// The document exists but has no usable score field.
    #[error("malformed document '{collection}/{key}': {reason}")]
    MalformedDocument {
        /// Collection being read.
        collection: String,
        /// Document key.
        key: String,
        /// What was wrong.
        reason: String,
    },

    /// An access token could not be obtained.
    #[error("store authentication failed: {0}")]
    Auth(String),

    /// A seed file could not be read or parsed.
    #[error("invalid seed file {path}: {message}")]
    Seed {
        /// Seed file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
