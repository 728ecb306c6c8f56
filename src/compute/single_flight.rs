//! Per-key in-flight suppression.
//!
//! Concurrent callers for the same key share one underlying future. The entry is
//! removed when the leader finishes or is dropped; followers already holding the
//! shared future still run it to completion.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;

type InFlight<K, V> = Arc<Mutex<HashMap<K, Shared<BoxFuture<'static, V>>>>>;

pub struct SingleFlight<K, V> {
    in_flight: InFlight<K, V>,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> Clone for SingleFlight<K, V> {
    fn clone(&self) -> Self {
        Self {
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<K, V> std::fmt::Debug for SingleFlight<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `make()` for `key` unless a call for `key` is already in flight, in which
    /// case the existing call's output is awaited and cloned.
    ///
    /// Returns the output and whether this caller started the call.
    pub async fn run<F>(&self, key: K, make: F) -> (V, bool)
    where
        F: FnOnce() -> BoxFuture<'static, V>,
    {
        let (shared, guard) = {
            let mut map = self.in_flight.lock();
            match map.get(&key) {
                Some(existing) => (existing.clone(), None),
                None => {
                    let shared = make().shared();
                    map.insert(key.clone(), shared.clone());
                    let guard = LeaderGuard {
                        in_flight: self.in_flight.clone(),
                        key: Some(key),
                        shared: shared.clone(),
                    };
                    (shared, Some(guard))
                }
            }
        };

        let output = shared.await;
        let leader = guard.is_some();
        drop(guard);
        (output, leader)
    }

    /// Number of keys with a call currently in flight.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.lock().len()
    }
}

struct LeaderGuard<K, V>
where
    K: Eq + Hash,
{
    in_flight: InFlight<K, V>,
    key: Option<K>,
    shared: Shared<BoxFuture<'static, V>>,
}

impl<K, V> Drop for LeaderGuard<K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let Some(key) = self.key.take() else {
            return;
        };
        let mut map = self.in_flight.lock();
        // Only remove our own entry; a later leader may have replaced it.
        if map.get(&key).is_some_and(|f| f.ptr_eq(&self.shared)) {
            map.remove(&key);
        }
    }
}
