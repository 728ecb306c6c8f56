//! Per-request delegation policy.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{debug, info, instrument, warn};

use super::error::DelegateError;
use super::single_flight::SingleFlight;
use super::{EngineResponse, ScoreDelegate, ScoreRequest};
use crate::constants::{ENGINE_SENTINEL_SCORE, MSG_ENGINE_FAILED, MSG_ENGINE_TIMEOUT};
use crate::hashing::PairKey;
use crate::sequence::CanonicalPair;

/// Default bound on one engine call.
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a delegation produced no score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateFailure {
    /// Transport error, non-success status or undecodable body.
    Unavailable,
    /// The engine answered with the reserved "could not compute" score.
    Sentinel,
    /// No answer within the configured bound.
    TimedOut,
}

impl DelegateFailure {
    /// Caller-visible message.
    pub fn message(&self) -> &'static str {
        match self {
            DelegateFailure::Unavailable | DelegateFailure::Sentinel => MSG_ENGINE_FAILED,
            DelegateFailure::TimedOut => MSG_ENGINE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelegateOutcome {
    Scored { score: f64 },
    Failed(DelegateFailure),
}

/// Wraps a [`ScoreDelegate`] with a timeout, sentinel mapping and optional
/// single-flight keyed by [`PairKey`]. One attempt per call, no retries.
#[derive(Clone)]
pub struct ComputeStage {
    delegate: Arc<dyn ScoreDelegate>,
    timeout: Duration,
    in_flight: Option<SingleFlight<PairKey, DelegateOutcome>>,
}

impl ComputeStage {
    pub fn new(delegate: Arc<dyn ScoreDelegate>, timeout: Duration, single_flight: bool) -> Self {
        Self {
            delegate,
            timeout,
            in_flight: single_flight.then(SingleFlight::new),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn single_flight_enabled(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Asks the engine to score `pair`, passing `key` for write-back.
    #[instrument(skip(self, pair, key), fields(key = %key))]
    pub async fn delegate(&self, pair: &CanonicalPair, key: &PairKey) -> DelegateOutcome {
        let request = ScoreRequest {
            first_protein_sequence: pair.first().as_str().to_string(),
            second_protein_sequence: pair.second().as_str().to_string(),
            protein_hash_id: key.clone(),
        };

        let Some(in_flight) = &self.in_flight else {
            return Self::call_once(self.delegate.clone(), request, self.timeout).await;
        };

        let delegate = self.delegate.clone();
        let timeout = self.timeout;
        let (outcome, leader) = in_flight
            .run(key.clone(), move || {
                Self::call_once(delegate, request, timeout).boxed()
            })
            .await;

        if !leader {
            debug!("Joined in-flight engine call");
        }
        outcome
    }

    async fn call_once(
        delegate: Arc<dyn ScoreDelegate>,
        request: ScoreRequest,
        timeout: Duration,
    ) -> DelegateOutcome {
        let result = match tokio::time::timeout(timeout, delegate.score(&request)).await {
            Ok(result) => result,
            Err(_) => Err(DelegateError::Timeout { after: timeout }),
        };
        interpret(result)
    }
}

impl std::fmt::Debug for ComputeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeStage")
            .field("timeout", &self.timeout)
            .field("single_flight", &self.in_flight.is_some())
            .finish()
    }
}

/// Maps an engine result to an outcome. The sentinel score is never surfaced.
pub fn interpret(result: Result<EngineResponse, DelegateError>) -> DelegateOutcome {
    match result {
        Ok(resp) if resp.score == ENGINE_SENTINEL_SCORE => {
            warn!("Engine reported it could not compute a score");
            DelegateOutcome::Failed(DelegateFailure::Sentinel)
        }
        Ok(resp) => {
            match resp.persisted {
                Some(true) => debug!("Engine confirmed write-back"),
                Some(false) => warn!("Engine did not persist the computed score"),
                None => debug!("Engine gave no write-back confirmation"),
            }
            info!(score = resp.score, "Engine computed score");
            DelegateOutcome::Scored { score: resp.score }
        }
        Err(DelegateError::Timeout { after }) => {
            warn!(timeout = ?after, "Engine call timed out");
            DelegateOutcome::Failed(DelegateFailure::TimedOut)
        }
        Err(e) => {
            warn!(error = %e, "Engine call failed");
            DelegateOutcome::Failed(DelegateFailure::Unavailable)
        }
    }
}
