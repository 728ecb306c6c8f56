//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Engine timeout could not be parsed as whole seconds.
    #[error("failed to parse engine timeout '{value}': {source}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Engine timeout of zero would fail every request.
    #[error("engine timeout must be greater than zero")]
    ZeroTimeout,

    /// Unknown store backend name.
    #[error("unknown store backend '{value}': expected 'memory' or 'firestore'")]
    InvalidStoreBackend { value: String },

    /// A URL setting is not an `http://` or `https://` URL.
    #[error("invalid {name} '{value}': expected an http(s) URL")]
    InvalidUrl { name: &'static str, value: String },

    /// Both tiers point at the same collection.
    #[error("curated and opportunistic tiers must use different collections (both are '{name}')")]
    SameCollection { name: String },

    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
