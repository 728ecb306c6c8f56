//! In-memory tier double that counts reads.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::tiered::{CuratedLookup, OpportunisticLookup};
use crate::hashing::{PairKey, derive_pair_key};
use crate::store::{ScoreRecord, StoreError, StoreResult};

/// Test tier: a key/score map plus a read counter and a failure switch.
#[derive(Debug, Default, Clone)]
pub struct MockTier {
    entries: Arc<RwLock<HashMap<PairKey, ScoreRecord>>>,
    reads: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockTier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: PairKey, score: f64) {
        self.entries.write().insert(key, ScoreRecord::new(score));
    }

    /// Inserts under the key derived from two sequences.
    pub fn insert_pair(&self, first: &str, second: &str, score: f64) {
        self.insert(derive_pair_key(first, second), score);
    }

    /// Makes every subsequent read return a store error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn read(&self, key: &PairKey) -> StoreResult<Option<ScoreRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::RequestFailed {
                collection: "mock".to_string(),
                message: "mock tier failure".to_string(),
            });
        }
        Ok(self.entries.read().get(key).copied())
    }
}

#[async_trait]
impl CuratedLookup for MockTier {
    async fn get_curated(&self, key: &PairKey) -> StoreResult<Option<ScoreRecord>> {
        self.read(key)
    }
}

#[async_trait]
impl OpportunisticLookup for MockTier {
    async fn get_opportunistic(&self, key: &PairKey) -> StoreResult<Option<ScoreRecord>> {
        self.read(key)
    }
}
