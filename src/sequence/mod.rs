//! Input validation and canonicalization for protein sequence pairs.
//!
//! Validation runs each check across both inputs before moving to the next check, so
//! `("", "AC1")` reports the empty sequence rather than the digit.

pub mod error;


pub use error::ValidationError;

use std::fmt;

use crate::constants::is_amino_acid;

/// A validated, uppercase protein sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sequence(String);

impl Sequence {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Sequence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two canonical sequences in the order the caller supplied them.
///
/// Argument order is preserved for the engine call; lookups go through
/// [`crate::hashing::derive_pair_key`], which is order-independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPair {
    first: Sequence,
    second: Sequence,
}

impl CanonicalPair {
    pub fn first(&self) -> &Sequence {
        &self.first
    }

    pub fn second(&self) -> &Sequence {
        &self.second
    }

    /// Returns `true` when both sequences are equal after case normalization.
    #[inline]
    pub fn is_identical(&self) -> bool {
        self.first == self.second
    }

}

/// Checks raw input well-formedness and alphabet membership for both sequences.
///
/// Checks run in order (presence, non-empty, letters only, amino-acid alphabet) and
/// the first failing check wins.
pub fn validate(first: Option<&str>, second: Option<&str>) -> Result<(), ValidationError> {
    let (Some(first), Some(second)) = (first, second) else {
        return Err(ValidationError::Missing);
    };

    check_non_empty(first)?;
    check_non_empty(second)?;

    check_letters(first)?;
    check_letters(second)?;

    check_alphabet(&first.to_ascii_uppercase())?;
    check_alphabet(&second.to_ascii_uppercase())?;

    Ok(())
}

/// Uppercases both sequences without reordering them.
///
/// Callers must have run [`validate`] first; use [`parse_pair`] to do both.
pub fn canonicalize(first: &str, second: &str) -> CanonicalPair {
    CanonicalPair {
        first: Sequence(first.to_ascii_uppercase()),
        second: Sequence(second.to_ascii_uppercase()),
    }
}

/// Validates and canonicalizes a raw pair in one step.
pub fn parse_pair(
    first: Option<&str>,
    second: Option<&str>,
) -> Result<CanonicalPair, ValidationError> {
    validate(first, second)?;
    // validate() returned Ok, so both are present.
    let (Some(first), Some(second)) = (first, second) else {
        return Err(ValidationError::Missing);
    };
    Ok(canonicalize(first, second))
}

fn check_non_empty(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(())
}

fn check_letters(raw: &str) -> Result<(), ValidationError> {
    if !raw.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ValidationError::NotLetters);
    }
    Ok(())
}

fn check_alphabet(upper: &str) -> Result<(), ValidationError> {
    if !upper.bytes().all(is_amino_acid) {
        return Err(ValidationError::InvalidCode);
    }
    Ok(())
}
