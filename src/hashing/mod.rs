//! Order-independent pair keys.
//!
//! Pair keys are persisted externally as document IDs in both store tiers, so the
//! derivation is versioned through [`KeyScheme`]. Changing how a scheme orders,
//! joins, hashes or encodes its input invalidates every stored key; add a new
//! variant instead.

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::sequence::CanonicalPair;

/// Byte placed between the two sequences before hashing.
pub const PAIR_KEY_SEPARATOR: &[u8] = b"|";

/// Versioned pair-key derivation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyScheme {
    /// BLAKE3 over `smaller | larger` (byte order of the uppercase sequences),
    /// lowercase hex, prefixed `pk1-`.
    #[default]
    V1,
}

impl KeyScheme {
    /// The scheme used for every key this build reads.
    pub const ACTIVE: KeyScheme = KeyScheme::V1;

    #[inline]
    pub fn prefix(&self) -> &'static str {
        match self {
            KeyScheme::V1 => "pk1-",
        }
    }

    /// Derives the key for an unordered pair.
    ///
    /// Inputs are uppercased here as well, so `derive("acde", "FGHI")` and
    /// `derive("FGHI", "ACDE")` agree.
    pub fn derive(&self, first: &str, second: &str) -> PairKey {
        match self {
            KeyScheme::V1 => {
                let first = first.to_ascii_uppercase();
                let second = second.to_ascii_uppercase();
                let (smaller, larger) = if first.as_bytes() <= second.as_bytes() {
                    (first, second)
                } else {
                    (second, first)
                };

                let mut hasher = Hasher::new();
                hasher.update(smaller.as_bytes());
                hasher.update(PAIR_KEY_SEPARATOR);
                hasher.update(larger.as_bytes());
                let digest = hasher.finalize();

                PairKey(format!("{}{}", self.prefix(), digest.to_hex()))
            }
        }
    }
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyScheme::V1 => f.write_str("v1"),
        }
    }
}

/// Deterministic identifier for an unordered sequence pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    /// Wraps an already-derived key (for example one read back from the store).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the scheme whose prefix this key carries, if any.
    pub fn scheme(&self) -> Option<KeyScheme> {
        [KeyScheme::V1]
            .into_iter()
            .find(|scheme| self.0.starts_with(scheme.prefix()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for PairKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives a pair key with the active scheme.
#[inline]
pub fn derive_pair_key(first: &str, second: &str) -> PairKey {
    KeyScheme::ACTIVE.derive(first, second)
}

/// Derives the active-scheme key for a canonical pair.
#[inline]
pub fn pair_key_for(pair: &CanonicalPair) -> PairKey {
    derive_pair_key(pair.first().as_str(), pair.second().as_str())
}
