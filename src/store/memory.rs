//! In-process store backend.
//!
//! Seed file format: a JSON object mapping collection names to entry lists. Each
//! entry carries a precomputed `key` or the two sequences it should be derived from.
//!
//! ```json
//! {
//!   "train-pairs": [
//!     { "first": "ACDE", "second": "FGHI", "score": 0.91 },
//!     { "key": "pk1-9e8c...", "score": 0.91 }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::info;

use super::error::{StoreError, StoreResult};
use super::model::ScoreRecord;
use super::DocumentStore;
use crate::hashing::{PairKey, derive_pair_key};

type Collections = HashMap<String, HashMap<PairKey, ScoreRecord>>;

/// One seed-file entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub second: Option<String>,
    pub score: f64,
}

impl SeedEntry {
    fn pair_key(&self) -> Option<PairKey> {
        match (&self.key, &self.first, &self.second) {
            (Some(key), _, _) => Some(PairKey::from_raw(key.clone())),
            (None, Some(first), Some(second)) => Some(derive_pair_key(first, second)),
            _ => None,
        }
    }
}

/// Thread-safe in-memory collections.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a seed file (see module docs).
    pub fn from_seed_file(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::Seed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let store = Self::from_seed_json(&raw).map_err(|e| StoreError::Seed {
            path: path.to_path_buf(),
            message: e,
        })?;

        info!(
            path = %path.display(),
            entries = store.total_len(),
            "Seeded in-memory store"
        );
        Ok(store)
    }

    /// Parses seed JSON (see module docs).
    pub fn from_seed_json(raw: &str) -> Result<Self, String> {
        let seed: HashMap<String, Vec<SeedEntry>> =
            serde_json::from_str(raw).map_err(|e| e.to_string())?;

        let store = Self::new();
        for (collection, entries) in seed {
            for (index, entry) in entries.iter().enumerate() {
                let key = entry.pair_key().ok_or_else(|| {
                    format!("{collection}[{index}]: entry needs `key` or both `first` and `second`")
                })?;
                store.insert(&collection, key, ScoreRecord::new(entry.score));
            }
        }
        Ok(store)
    }

    pub fn insert(&self, collection: &str, key: PairKey, record: ScoreRecord) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(key, record);
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    pub fn total_len(&self) -> usize {
        self.collections.read().values().map(HashMap::len).sum()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &PairKey) -> StoreResult<Option<ScoreRecord>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.get(key))
            .copied())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
