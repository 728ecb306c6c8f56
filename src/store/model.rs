//! Store model types.

use serde::{Deserialize, Serialize};

/// A stored similarity score for one pair key.
///
/// # Example
/// ```rust
/// use pairscore::store::ScoreRecord;
///
/// let record: ScoreRecord = serde_json::from_str(r#"{"score": 0.42}"#).unwrap();
/// assert_eq!(record.score, 0.42);
/// assert!(!record.is_cached);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Similarity score, expected in `0.0..=1.0`.
    pub score: f64,
    /// Set by the engine on write-back; informational only.
    #[serde(default)]
    pub is_cached: bool,
}

impl ScoreRecord {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            is_cached: false,
        }
    }
}
