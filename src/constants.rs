//! Cross-cutting, shared constants.
//!
//! Caller-visible messages live here so the validator, the pipeline and the tests
//! agree on the exact wording.

/// The 20 standard amino-acid one-letter codes, uppercase.
pub const AMINO_ACIDS: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

/// Collection holding the curated (pre-populated, authoritative) pair scores.
pub const CURATED_COLLECTION: &str = "train-pairs";

/// Collection holding scores previously computed by the engine.
pub const OPPORTUNISTIC_COLLECTION: &str = "new-pairs";

/// Score returned for a pair of identical sequences.
pub const IDENTICAL_SCORE: f64 = 1.0;

/// Reserved engine score meaning "could not compute".
pub const ENGINE_SENTINEL_SCORE: f64 = -1.0;

pub const MSG_SEQUENCES_MISSING: &str = "sequences must be provided.";
pub const MSG_SEQUENCE_EMPTY: &str = "sequence cannot be empty.";
pub const MSG_SEQUENCE_NOT_LETTERS: &str = "sequence can only contain letters.";
pub const MSG_SEQUENCE_INVALID_CODE: &str = "sequence contains invalid amino-acid code.";
pub const MSG_ENGINE_FAILED: &str = "error occurred while getting model prediction";
pub const MSG_ENGINE_TIMEOUT: &str = "score computation timed out";

/// Returns `true` if `byte` (already uppercase) is a standard amino-acid code.
#[inline]
pub fn is_amino_acid(byte: u8) -> bool {
    AMINO_ACIDS.contains(&byte)
}
