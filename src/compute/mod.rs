//! Delegation to the external scoring engine.
//!
//! [`ScoreDelegate`] is the transport seam; [`ComputeStage`] wraps it with the
//! per-request policy (single attempt, bounded timeout, sentinel mapping and
//! per-key in-flight suppression).

pub mod client;
pub mod error;
pub mod single_flight;
pub mod stage;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use client::HttpScoreDelegate;
pub use error::DelegateError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockScoreDelegate;
pub use single_flight::SingleFlight;
pub use stage::{ComputeStage, DelegateFailure, DelegateOutcome};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::hashing::PairKey;

/// Body sent to the engine.
///
/// `protein_hash_id` is the pair key the engine writes its result back under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub first_protein_sequence: String,
    pub second_protein_sequence: String,
    pub protein_hash_id: PairKey,
}

/// Body returned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse {
    /// Similarity score, or `-1` when the engine could not compute one.
    pub score: f64,
    /// Write-back confirmation for the opportunistic tier, when the engine reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
}

impl EngineResponse {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            persisted: None,
        }
    }
}

#[async_trait]
/// One call to the scoring engine.
pub trait ScoreDelegate: Send + Sync {
    async fn score(&self, request: &ScoreRequest) -> Result<EngineResponse, DelegateError>;
}
