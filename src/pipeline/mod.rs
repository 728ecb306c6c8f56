//! The similarity lookup pipeline.
//!
//! Validator → canonicalizer → pair key → curated tier → opportunistic tier →
//! engine, with every branch folded into a [`SimilarityOutcome`].

pub mod envelope;


pub use envelope::{OutcomeStatus, PAIRSCORE_STATUS_HEADER, ResultEnvelope, SimilarityOutcome};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::cache::{CuratedLookup, OpportunisticLookup, TieredLookup, TieredLookupResult};
use crate::compute::stage::DEFAULT_ENGINE_TIMEOUT;
use crate::compute::{ComputeStage, DelegateOutcome, ScoreDelegate};
use crate::config::Config;
use crate::hashing::pair_key_for;
use crate::sequence::{CanonicalPair, parse_pair};

/// Settings the pipeline needs from process configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bound on one engine call.
    pub engine_timeout: Duration,
    /// Share one engine call between concurrent requests for the same pair.
    pub single_flight: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            engine_timeout: DEFAULT_ENGINE_TIMEOUT,
            single_flight: true,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            engine_timeout: config.engine_timeout,
            single_flight: config.single_flight,
        }
    }
}

/// Stateless per request; the only shared state is the store and the in-flight map.
#[derive(Debug, Clone)]
pub struct SimilarityPipeline {
    lookup: TieredLookup,
    compute: ComputeStage,
}

impl SimilarityPipeline {
    pub fn new(
        config: PipelineConfig,
        curated: Arc<dyn CuratedLookup>,
        opportunistic: Arc<dyn OpportunisticLookup>,
        delegate: Arc<dyn ScoreDelegate>,
    ) -> Self {
        Self::from_parts(
            TieredLookup::new(curated, opportunistic),
            ComputeStage::new(delegate, config.engine_timeout, config.single_flight),
        )
    }

    pub fn from_parts(lookup: TieredLookup, compute: ComputeStage) -> Self {
        Self { lookup, compute }
    }

    pub fn compute(&self) -> &ComputeStage {
        &self.compute
    }

    /// Runs the full pipeline on raw caller input.
    #[instrument(
        skip(self, first, second),
        fields(
            first_len = first.map(str::len),
            second_len = second.map(str::len),
        )
    )]
    pub async fn evaluate(&self, first: Option<&str>, second: Option<&str>) -> SimilarityOutcome {
        match parse_pair(first, second) {
            Ok(pair) => self.evaluate_pair(&pair).await,
            Err(e) => {
                debug!(reason = %e, "Rejected input");
                SimilarityOutcome::Invalid(e)
            }
        }
    }

    /// Runs lookup and delegation for an already-canonical pair.
    pub async fn evaluate_pair(&self, pair: &CanonicalPair) -> SimilarityOutcome {
        if pair.is_identical() {
            debug!("Identical sequences, short-circuiting");
            return SimilarityOutcome::Identical;
        }

        let key = pair_key_for(pair);

        match self.lookup.lookup(&key).await {
            TieredLookupResult::HitCurated(record) => {
                return SimilarityOutcome::CuratedHit {
                    score: record.score,
                };
            }
            TieredLookupResult::HitOpportunistic(record) => {
                return SimilarityOutcome::OpportunisticHit {
                    score: record.score,
                };
            }
            TieredLookupResult::Miss => {}
        }

        debug!(key = %key, "Cache miss, delegating to engine");
        match self.compute.delegate(pair, &key).await {
            DelegateOutcome::Scored { score } => SimilarityOutcome::Computed { score },
            DelegateOutcome::Failed(failure) => SimilarityOutcome::EngineFailed(failure),
        }
    }
}
