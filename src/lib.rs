//! Pairscore library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! The similarity pipeline answers "how similar are these two protein sequences?"
//! from a curated dataset, then an opportunistic cache, and only on a full miss
//! from an external scoring engine.
//!
//! ## Core Types
//! - [`SimilarityPipeline`], [`SimilarityOutcome`], [`ResultEnvelope`] - Orchestration and response shape
//! - [`Sequence`], [`CanonicalPair`], [`ValidationError`] - Validated input
//! - [`PairKey`], [`KeyScheme`] - Order-independent pair identifiers
//!
//! ## Collaborators
//! - [`DocumentStore`], [`FirestoreStore`], [`MemoryStore`] - Backing store
//! - [`TieredLookup`], [`CuratedLookup`], [`OpportunisticLookup`] - Two-tier lookup
//! - [`ScoreDelegate`], [`HttpScoreDelegate`], [`ComputeStage`] - Engine delegation
//!
//! ## Server
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//! - [`gateway::create_router_with_state`] - Axum router
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod compute;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod hashing;
pub mod pipeline;
pub mod sequence;
pub mod store;

#[cfg(any(test, feature = "mock"))]
pub use cache::MockTier;
pub use cache::{
    CollectionTier, CuratedLookup, OpportunisticLookup, Tier, TieredLookup, TieredLookupResult,
};

#[cfg(any(test, feature = "mock"))]
pub use compute::MockScoreDelegate;
pub use compute::{
    ComputeStage, DelegateError, DelegateFailure, DelegateOutcome, EngineResponse,
    HttpScoreDelegate, ScoreDelegate, ScoreRequest, SingleFlight,
};

pub use config::{Config, ConfigError, StoreBackend};
pub use constants::{AMINO_ACIDS, CURATED_COLLECTION, OPPORTUNISTIC_COLLECTION};
pub use gateway::{HandlerState, create_router_with_state};
pub use hashing::{KeyScheme, PairKey, derive_pair_key, pair_key_for};
pub use pipeline::{
    OutcomeStatus, PAIRSCORE_STATUS_HEADER, PipelineConfig, ResultEnvelope, SimilarityOutcome,
    SimilarityPipeline,
};
pub use sequence::{
    CanonicalPair, Sequence, ValidationError, canonicalize, parse_pair, validate,
};
pub use store::{
    DocumentStore, FirestoreAuth, FirestoreStore, MemoryStore, ScoreRecord, StoreError,
    StoreResult,
};
