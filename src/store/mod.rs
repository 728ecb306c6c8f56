//! Document-store collaborator.
//!
//! The similarity core only ever reads from the store. Two backends are provided:
//! [`FirestoreStore`] talks to the Firestore REST API, [`MemoryStore`] keeps
//! collections in process (optionally seeded from a JSON file).

pub mod error;
pub mod firestore;
pub mod memory;
mod model;

#[cfg(test)]
mod tests;

pub use error::{StoreError, StoreResult};
pub use firestore::{FirestoreAuth, FirestoreStore, parse_score_document};
pub use memory::{MemoryStore, SeedEntry};
pub use model::ScoreRecord;

use async_trait::async_trait;

use crate::hashing::PairKey;

#[async_trait]
/// Point reads against a keyed document collection.
pub trait DocumentStore: Send + Sync {
    /// Reads `collection/key`. Returns `Ok(None)` when the document does not exist.
    async fn get(&self, collection: &str, key: &PairKey) -> StoreResult<Option<ScoreRecord>>;

    /// Short backend name used in logs and health output.
    fn backend_name(&self) -> &'static str;
}
