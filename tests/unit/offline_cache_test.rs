//! Unit tests for the offline cache layers.

use std::time::Duration;
use wayfarer::preload::MemoryCache;
use wayfarer::storage::{KeyValueStore, SqliteStore};

#[test]
fn test_memory_cache_fifo_eviction() {
    let cache: MemoryCache<String> = MemoryCache::new(3, Duration::from_secs(60));
    cache.insert("a", "1".into());
    cache.insert("b", "2".into());
    cache.insert("c", "3".into());
    cache.insert("d", "4".into());

    assert_eq!(cache.len(), 3);
    assert!(cache.get("a").is_none(), "oldest-inserted should be evicted");
    assert_eq!(cache.get("d"), Some("4".into()));
}

#[test]
fn test_memory_cache_age_bound() {
    let cache: MemoryCache<u32> = MemoryCache::new(10, Duration::from_secs(0));
    cache.insert("a", 1);
    assert!(cache.get("a").is_none());
}

#[test]
fn test_sqlite_store_on_disk_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("offline.db");

    let store = SqliteStore::open(&path).unwrap();
    store.set("streetview:top-1", "{\"pano_id\":\"abc\"}", None).unwrap();
    drop(store);

    // Reopen: the entry survives the process.
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(
        store.get("streetview:top-1").unwrap(),
        Some("{\"pano_id\":\"abc\"}".to_string())
    );
}

#[test]
fn test_sqlite_store_ttl_expiry() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .set("details:top-1", "v", Some(Duration::from_secs(0)))
        .unwrap();
    assert_eq!(store.get("details:top-1").unwrap(), None);

    store
        .set("details:top-2", "v", Some(Duration::from_secs(3600)))
        .unwrap();
    assert!(store.get("details:top-2").unwrap().is_some());
}

#[test]
fn test_sqlite_store_prune() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.set("a", "v", Some(Duration::from_secs(0))).unwrap();
    store.set("b", "v", None).unwrap();

    assert_eq!(store.prune_expired().unwrap(), 1);
    assert_eq!(store.len().unwrap(), 1);
    assert!(store.get("b").unwrap().is_some());
}
