//! Integration tests for preloading and offline fallback.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use wayfarer::catalog::Landmark;
use wayfarer::geo::Coordinates;
use wayfarer::preload::{DetailSource, FetchError, LandmarkDetails, PreloadTarget, Preloader};
use wayfarer::storage::{KeyValueStore, SqliteStore};

#[derive(Default)]
struct FlakyState {
    offline: AtomicBool,
    fetches: AtomicUsize,
}

/// Source that can be switched offline mid-test.
#[derive(Clone, Default)]
struct FlakySource {
    state: Arc<FlakyState>,
}

impl DetailSource<LandmarkDetails> for FlakySource {
    async fn fetch(&self, landmark: &Landmark) -> Result<LandmarkDetails, FetchError> {
        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        if self.state.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network("connection reset".into()));
        }
        Ok(LandmarkDetails {
            name: landmark.name.clone(),
            rating: Some(4.6),
            photo_urls: vec![format!("https://photos.example/{}.jpg", landmark.id)],
            opening_hours: Vec::new(),
            formatted_address: None,
        })
    }
}

fn landmark(id: &str, name: &str) -> Landmark {
    Landmark::new(id, name, Coordinates::new(48.8584, 2.2945))
}

#[tokio::test]
async fn test_details_survive_going_offline() {
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let lm = landmark("top-1", "Eiffel Tower");

    // Online session: fetched and written through to the store.
    let online = Preloader::new(FlakySource::default(), "details").with_store(store.clone());
    let details = online.get(&lm).await.unwrap();
    assert_eq!(details.name, "Eiffel Tower");

    // Fresh offline session over the same store: the persistent layer
    // answers without any network fetch.
    let source = FlakySource::default();
    let state = source.state.clone();
    state.offline.store(true, Ordering::SeqCst);

    let offline = Preloader::new(source, "details").with_store(store);
    let recovered = offline.get(&lm).await.unwrap();
    assert_eq!(recovered.name, "Eiffel Tower");
    assert_eq!(state.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_batch_preload_is_best_effort() {
    let source = FlakySource::default();
    let state = source.state.clone();
    let preloader = Preloader::new(source, "details");
    let batch = vec![
        landmark("top-1", "Eiffel Tower"),
        landmark("top-2", "Louvre"),
        landmark("top-3", "Notre-Dame"),
    ];

    state.offline.store(true, Ordering::SeqCst);
    // Nothing cached and every fetch fails: the batch still completes.
    preloader.preload(&batch).await;
    assert_eq!(state.fetches.load(Ordering::SeqCst), 3);

    // Back online: the batch fills the memory cache.
    state.offline.store(false, Ordering::SeqCst);
    preloader.preload(&batch).await;
    for lm in &batch {
        assert!(preloader.get(lm).await.is_some());
    }
    // Those gets were memory hits, not fresh fetches.
    assert_eq!(state.fetches.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_preload_target_warms_the_cache() {
    let source = FlakySource::default();
    let state = source.state.clone();
    let preloader = Arc::new(Preloader::new(source, "details"));
    let target: Arc<dyn PreloadTarget> = preloader.clone();
    let lm = landmark("top-1", "Eiffel Tower");

    target.warm(&lm).await;
    assert_eq!(state.fetches.load(Ordering::SeqCst), 1);

    // The warmed entry serves the next read without fetching.
    assert!(preloader.get(&lm).await.is_some());
    assert_eq!(state.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_relevance_gate_blocks_stale_write_back() {
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let preloader =
        Preloader::new(FlakySource::default(), "details").with_store(store.clone());
    let lm = landmark("top-1", "Eiffel Tower");

    // The user already moved on before the result lands.
    preloader.set_relevant(["top-9".to_string()].into());
    let value = preloader.get(&lm).await;

    // The caller still gets the value, but nothing was cached.
    assert!(value.is_some());
    assert!(store.get("details:top-1").unwrap().is_none());
}
