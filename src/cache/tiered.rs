//! Tier chain: curated, then opportunistic, sequentially.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::types::{Tier, TieredLookupResult};
use crate::constants::ENGINE_SENTINEL_SCORE;
use crate::hashing::PairKey;
use crate::store::{DocumentStore, ScoreRecord, StoreResult};

#[async_trait]
/// Read access to the curated dataset.
pub trait CuratedLookup: Send + Sync {
    async fn get_curated(&self, key: &PairKey) -> StoreResult<Option<ScoreRecord>>;
}

#[async_trait]
/// Read access to the engine's write-back cache.
pub trait OpportunisticLookup: Send + Sync {
    async fn get_opportunistic(&self, key: &PairKey) -> StoreResult<Option<ScoreRecord>>;
}

/// One store collection acting as a tier.
#[derive(Clone)]
pub struct CollectionTier {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl CollectionTier {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl std::fmt::Debug for CollectionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionTier")
            .field("backend", &self.store.backend_name())
            .field("collection", &self.collection)
            .finish()
    }
}

#[async_trait]
impl CuratedLookup for CollectionTier {
    async fn get_curated(&self, key: &PairKey) -> StoreResult<Option<ScoreRecord>> {
        self.store.get(&self.collection, key).await
    }
}

#[async_trait]
impl OpportunisticLookup for CollectionTier {
    async fn get_opportunistic(&self, key: &PairKey) -> StoreResult<Option<ScoreRecord>> {
        self.store.get(&self.collection, key).await
    }
}

/// Sequential curated → opportunistic lookup.
///
/// A curated hit is returned without touching the opportunistic tier. A store error,
/// or a record holding the engine's failure score, is logged and treated as a miss
/// for that tier.
#[derive(Clone)]
pub struct TieredLookup {
    curated: Arc<dyn CuratedLookup>,
    opportunistic: Arc<dyn OpportunisticLookup>,
}

impl TieredLookup {
    pub fn new(curated: Arc<dyn CuratedLookup>, opportunistic: Arc<dyn OpportunisticLookup>) -> Self {
        Self {
            curated,
            opportunistic,
        }
    }

    /// Builds both tiers over one store, one collection each.
    pub fn from_store(
        store: Arc<dyn DocumentStore>,
        curated_collection: &str,
        opportunistic_collection: &str,
    ) -> Self {
        Self::new(
            Arc::new(CollectionTier::new(store.clone(), curated_collection)),
            Arc::new(CollectionTier::new(store, opportunistic_collection)),
        )
    }

    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn lookup(&self, key: &PairKey) -> TieredLookupResult {
        debug!("Checking curated tier");
        let curated = self.curated.get_curated(key).await;
        if let Some(record) = Self::settle(Tier::Curated, curated) {
            info!(score = record.score, "Curated tier hit");
            return TieredLookupResult::HitCurated(record);
        }

        debug!("Curated miss, checking opportunistic tier");
        let opportunistic = self.opportunistic.get_opportunistic(key).await;
        if let Some(record) = Self::settle(Tier::Opportunistic, opportunistic) {
            info!(score = record.score, "Opportunistic tier hit");
            return TieredLookupResult::HitOpportunistic(record);
        }

        debug!("Both tiers missed");
        TieredLookupResult::Miss
    }

    fn settle(tier: Tier, result: StoreResult<Option<ScoreRecord>>) -> Option<ScoreRecord> {
        match result {
            Ok(Some(record)) if record.score == ENGINE_SENTINEL_SCORE => {
                warn!(tier = %tier, "Tier holds the engine failure score. Treating as miss.");
                None
            }
            Ok(record) => record,
            Err(e) => {
                warn!(tier = %tier, error = %e, "Tier read failed. Treating as miss.");
                None
            }
        }
    }
}

impl std::fmt::Debug for TieredLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredLookup").finish_non_exhaustive()
    }
}
