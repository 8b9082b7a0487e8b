//! Unit tests for the SQLite bookmark cache: freshness, scoping and invalidation.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::bookmark;
use linkshelf::database::Database;
use linkshelf::services::bookmark_cache::{BookmarkCache, BookmarkCacheTrait, CACHE_TTL};
use linkshelf::types::errors::CacheError;

const NOW: i64 = 1_700_000_000_000;

fn cache_for(db: &Arc<Database>, url: &str) -> BookmarkCache {
    BookmarkCache::new(db.clone(), url)
}

#[test]
fn test_default_ttl_is_fifteen_minutes() {
    assert_eq!(CACHE_TTL, Duration::from_secs(900));
}

#[test]
fn test_empty_cache_returns_none() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let cache = cache_for(&db, "https://a.example");
    assert!(cache.load_fresh_at(NOW).unwrap().is_none());
    assert!(cache.cached_at().unwrap().is_none());
}

#[test]
fn test_stored_list_round_trips_while_fresh() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let cache = cache_for(&db, "https://a.example");
    let mut b = bookmark(1, "One", &["a.b"]);
    b.extra.insert("unread".to_string(), serde_json::json!(true));

    cache.store_at(&[b.clone()], NOW).unwrap();
    let loaded = cache.load_fresh_at(NOW + 60_000).unwrap().unwrap();
    assert_eq!(loaded, vec![b]);
    assert_eq!(cache.cached_at().unwrap(), Some(NOW));
}

#[test]
fn test_entry_expires_at_ttl() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let cache = cache_for(&db, "https://a.example");
    cache.store_at(&[bookmark(1, "One", &[])], NOW).unwrap();

    let ttl = CACHE_TTL.as_millis() as i64;
    assert!(cache.load_fresh_at(NOW + ttl - 1).unwrap().is_some());
    assert!(cache.load_fresh_at(NOW + ttl).unwrap().is_none());
}

#[test]
fn test_custom_ttl() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let cache = cache_for(&db, "https://a.example").with_ttl(Duration::from_secs(1));
    cache.store_at(&[], NOW).unwrap();
    assert!(cache.is_fresh(NOW, NOW + 999));
    assert!(!cache.is_fresh(NOW, NOW + 1_000));
}

#[test]
fn test_entries_are_scoped_per_server() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let a = cache_for(&db, "https://a.example");
    let b = cache_for(&db, "https://b.example");

    a.store_at(&[bookmark(1, "One", &[])], NOW).unwrap();
    assert!(b.load_fresh_at(NOW).unwrap().is_none());

    b.store_at(&[], NOW).unwrap();
    a.invalidate().unwrap();
    assert!(a.cached_at().unwrap().is_none());
    assert_eq!(b.cached_at().unwrap(), Some(NOW));
}

#[test]
fn test_store_replaces_previous_entry() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let cache = cache_for(&db, "https://a.example");
    cache.store_at(&[bookmark(1, "One", &[])], NOW).unwrap();
    cache.store_at(&[bookmark(2, "Two", &[])], NOW + 5).unwrap();

    let loaded = cache.load_fresh_at(NOW + 10).unwrap().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, 2);
}

#[test]
fn test_corrupt_payload_is_a_serialization_error() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.connection()
        .execute(
            "INSERT INTO bookmark_cache (base_url, payload, cached_at) VALUES (?1, 'not json', ?2)",
            rusqlite::params!["https://a.example", NOW],
        )
        .unwrap();
    let cache = cache_for(&db, "https://a.example");
    assert!(matches!(
        cache.load_fresh_at(NOW),
        Err(CacheError::SerializationError(_))
    ));
}
