use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors raised while calling the scoring engine.
///
/// Details are logged; callers only ever see a generic failure message.
pub enum DelegateError {
    /// No response (connection refused, reset, DNS failure).
    #[error("engine request failed: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The engine answered with a non-success status.
    #[error("engine returned status {status}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The engine's body was not a score response.
    #[error("engine response could not be decoded: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// No answer within the configured bound.
    #[error("engine did not answer within {after:?}")]
    Timeout {
        /// Configured bound.
        after: Duration,
    },
}
