//! Layered cache-through preloader.

use crate::catalog::Landmark;
use crate::preload::{DetailSource, MemoryCache};
use crate::storage::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Default bound on in-memory cached payloads.
const DEFAULT_MAX_ITEMS: usize = 64;

/// Default in-memory payload age bound.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 60);

/// Default persistent TTL for offline entries.
const DEFAULT_STORE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Fetches and caches detail payloads for landmarks near the user.
///
/// Persistent-store failures are logged and treated as cache misses;
/// offline with nothing cached yields `None`, never an error. Results
/// arriving for a landmark the user has already left behind are not
/// written back.
pub struct Preloader<T, S> {
    memory: MemoryCache<T>,
    store: Option<Arc<dyn KeyValueStore>>,
    source: S,
    /// Namespace for persistent keys
    store_prefix: String,
    store_ttl: Duration,
    /// Landmark ids still worth caching for; empty set means "no
    /// relevance tracking", which admits everything
    relevant: Arc<RwLock<HashSet<String>>>,
}

impl<T, S> Preloader<T, S>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
    S: DetailSource<T>,
{
    /// Create a preloader over a detail source, without persistence.
    pub fn new(source: S, store_prefix: impl Into<String>) -> Self {
        Self {
            memory: MemoryCache::new(DEFAULT_MAX_ITEMS, DEFAULT_MAX_AGE),
            store: None,
            source,
            store_prefix: store_prefix.into(),
            store_ttl: DEFAULT_STORE_TTL,
            relevant: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Attach a persistent offline store.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the in-memory cache bounds.
    pub fn with_memory_bounds(mut self, max_items: usize, max_age: Duration) -> Self {
        self.memory = MemoryCache::new(max_items, max_age);
        self
    }

    /// Replace the set of landmark ids still worth caching for.
    pub fn set_relevant(&self, ids: HashSet<String>) {
        *self.relevant.write().unwrap() = ids;
    }

    fn is_relevant(&self, landmark_id: &str) -> bool {
        let relevant = self.relevant.read().unwrap();
        relevant.is_empty() || relevant.contains(landmark_id)
    }

    fn store_key(&self, landmark_id: &str) -> String {
        format!("{}:{}", self.store_prefix, landmark_id)
    }

    /// Fetch the payload for a landmark through the cache layers.
    pub async fn get(&self, landmark: &Landmark) -> Option<T> {
        if let Some(cached) = self.memory.get(&landmark.id) {
            return Some(cached);
        }

        if let Some(value) = self.read_store(&landmark.id) {
            self.memory.insert(landmark.id.clone(), value.clone());
            return Some(value);
        }

        match self.source.fetch(landmark).await {
            Ok(value) => {
                if self.is_relevant(&landmark.id) {
                    self.write_through(&landmark.id, &value);
                } else {
                    tracing::debug!(
                        id = %landmark.id,
                        "Fetched payload no longer relevant, not caching"
                    );
                }
                Some(value)
            }
            Err(e) => {
                tracing::debug!(id = %landmark.id, error = %e, "Detail fetch failed");
                None
            }
        }
    }

    /// Best-effort background fill for landmarks likely to be visited
    /// soon. Individual failures are swallowed; the batch always runs to
    /// completion.
    pub async fn preload(&self, landmarks: &[Landmark]) {
        let missing: Vec<&Landmark> = landmarks
            .iter()
            .filter(|lm| self.memory.get(&lm.id).is_none())
            .collect();

        if missing.is_empty() {
            return;
        }

        tracing::debug!(count = missing.len(), "Preloading landmark details");
        futures::future::join_all(missing.iter().map(|lm| self.get(lm))).await;
    }

    fn read_store(&self, landmark_id: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        match store.get(&self.store_key(landmark_id)) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(id = %landmark_id, error = %e, "Corrupt offline entry, ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                // Store trouble is a cache miss, never fatal.
                tracing::warn!(id = %landmark_id, error = %e, "Offline store read failed");
                None
            }
        }
    }

    fn write_through(&self, landmark_id: &str, value: &T) {
        self.memory.insert(landmark_id.to_string(), value.clone());

        let Some(store) = self.store.as_ref() else {
            return;
        };
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = store.set(&self.store_key(landmark_id), &json, Some(self.store_ttl))
                {
                    tracing::warn!(id = %landmark_id, error = %e, "Offline store write failed");
                }
            }
            Err(e) => {
                tracing::warn!(id = %landmark_id, error = %e, "Payload serialization failed");
            }
        }
    }
}

impl<T, S> crate::preload::PreloadTarget for Preloader<T, S>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
    S: DetailSource<T>,
{
    fn set_relevant(&self, ids: HashSet<String>) {
        Preloader::set_relevant(self, ids);
    }

    fn warm<'a>(&'a self, landmark: &'a Landmark) -> futures::future::BoxFuture<'a, ()> {
        Box::pin(async move {
            let _ = self.get(landmark).await;
        })
    }
}
