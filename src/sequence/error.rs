use thiserror::Error;

use crate::constants::{
    MSG_SEQUENCE_EMPTY, MSG_SEQUENCE_INVALID_CODE, MSG_SEQUENCE_NOT_LETTERS, MSG_SEQUENCES_MISSING,
};

/// Input rejected before any store or engine access.
///
/// The `Display` text is the exact message returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or both sequences were absent from the request.
    #[error("{}", MSG_SEQUENCES_MISSING)]
    Missing,

    /// One or both sequences were the empty string.
    #[error("{}", MSG_SEQUENCE_EMPTY)]
    Empty,

    /// A sequence contained digits, punctuation, whitespace or non-ASCII characters.
    #[error("{}", MSG_SEQUENCE_NOT_LETTERS)]
    NotLetters,

    /// A sequence contained a letter outside the 20 standard amino-acid codes.
    #[error("{}", MSG_SEQUENCE_INVALID_CODE)]
    InvalidCode,
}
