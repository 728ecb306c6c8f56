//! Uniform response envelope and the outcomes that map onto it.

use serde::{Deserialize, Serialize};

use crate::compute::DelegateFailure;
use crate::constants::IDENTICAL_SCORE;
use crate::sequence::ValidationError;

/// Response header naming which branch produced the envelope.
pub const PAIRSCORE_STATUS_HEADER: &str = "X-Pairscore-Status";

/// The single response shape returned to every caller.
///
/// `is_sw` ("served without the engine") is set on every success and omitted on
/// failures. `score` is never the engine's sentinel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sw: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResultEnvelope {
    pub fn scored(score: f64, is_sw: bool) -> Self {
        Self {
            success: true,
            score: Some(score),
            is_sw: Some(is_sw),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            score: None,
            is_sw: None,
            message: Some(message.into()),
        }
    }
}

/// Which branch terminated the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimilarityOutcome {
    Invalid(ValidationError),
    Identical,
    CuratedHit { score: f64 },
    OpportunisticHit { score: f64 },
    Computed { score: f64 },
    EngineFailed(DelegateFailure),
}

impl SimilarityOutcome {
    pub fn status(&self) -> OutcomeStatus {
        match self {
            SimilarityOutcome::Invalid(_) => OutcomeStatus::InvalidInput,
            SimilarityOutcome::Identical => OutcomeStatus::Identical,
            SimilarityOutcome::CuratedHit { .. } => OutcomeStatus::HitCurated,
            SimilarityOutcome::OpportunisticHit { .. } => OutcomeStatus::HitOpportunistic,
            SimilarityOutcome::Computed { .. } => OutcomeStatus::Computed,
            SimilarityOutcome::EngineFailed(_) => OutcomeStatus::EngineFailed,
        }
    }

    /// `true` when the response did not require the engine.
    pub fn served_without_engine(&self) -> bool {
        matches!(
            self,
            SimilarityOutcome::Identical
                | SimilarityOutcome::CuratedHit { .. }
                | SimilarityOutcome::OpportunisticHit { .. }
        )
    }

    /// Maps the outcome onto the response envelope.
    pub fn into_envelope(self) -> ResultEnvelope {
        match self {
            SimilarityOutcome::Invalid(e) => ResultEnvelope::failure(e.to_string()),
            SimilarityOutcome::Identical => ResultEnvelope::scored(IDENTICAL_SCORE, true),
            SimilarityOutcome::CuratedHit { score }
            | SimilarityOutcome::OpportunisticHit { score } => ResultEnvelope::scored(score, true),
            SimilarityOutcome::Computed { score } => ResultEnvelope::scored(score, false),
            SimilarityOutcome::EngineFailed(failure) => ResultEnvelope::failure(failure.message()),
        }
    }
}

impl From<SimilarityOutcome> for ResultEnvelope {
    fn from(outcome: SimilarityOutcome) -> Self {
        outcome.into_envelope()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    InvalidInput,
    Identical,
    HitCurated,
    HitOpportunistic,
    Computed,
    EngineFailed,
}

impl OutcomeStatus {
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            OutcomeStatus::InvalidInput => "INVALID_INPUT",
            OutcomeStatus::Identical => "IDENTICAL",
            OutcomeStatus::HitCurated => "HIT_CURATED",
            OutcomeStatus::HitOpportunistic => "HIT_OPPORTUNISTIC",
            OutcomeStatus::Computed => "COMPUTED",
            OutcomeStatus::EngineFailed => "ENGINE_FAILED",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}
