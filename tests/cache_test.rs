//! Tests for [`ImageCache`], the session-lifetime generated image storage.

use aerogen::{CacheConfig, CacheKey, ImageCache, ImagePayload};

fn payload(data: &str) -> ImagePayload {
    ImagePayload::from_base64("image/png", data)
}

#[test]
fn cache_miss_returns_none() {
    let cache = ImageCache::default();
    let key = CacheKey::new("nonexistent", "");
    assert!(tokio_test::block_on(cache.get(&key)).is_none());
}

#[test]
fn insert_then_get() {
    let cache = ImageCache::default();
    let key = CacheKey::new("Vanguard", "rugged");
    tokio_test::block_on(cache.insert(key.clone(), payload("AAAA")));

    let got = tokio_test::block_on(cache.get(&key));
    assert_eq!(got, Some(payload("AAAA")));
    assert!(cache.contains(&key));
}

#[test]
fn overwrite_replaces_entry() {
    let cache = ImageCache::default();
    let key = CacheKey::new("Vanguard", "rugged");
    tokio_test::block_on(cache.insert(key.clone(), payload("AAAA")));
    tokio_test::block_on(cache.insert(key.clone(), payload("BBBB")));

    assert_eq!(tokio_test::block_on(cache.get(&key)), Some(payload("BBBB")));
}

#[test]
fn independent_keys() {
    let cache = ImageCache::default();
    let alpha = CacheKey::new("alpha", "x");
    let beta = CacheKey::new("beta", "x");
    tokio_test::block_on(cache.insert(alpha.clone(), payload("AAAA")));
    tokio_test::block_on(cache.insert(beta.clone(), payload("BBBB")));

    assert!(cache.contains(&alpha));
    assert!(cache.contains(&beta));
    assert!(!cache.contains(&CacheKey::new("gamma", "x")));
}

#[tokio::test]
async fn len_counts_distinct_keys() {
    let cache = ImageCache::default();
    assert!(cache.is_empty());
    for title in ["a", "b", "c"] {
        cache
            .insert(CacheKey::new(title, "d"), payload("AAAA"))
            .await;
    }
    cache.insert(CacheKey::new("a", "d"), payload("BBBB")).await;

    cache.run_pending_tasks().await;
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn bounded_cache_evicts_beyond_capacity() {
    let cache = ImageCache::new(&CacheConfig::new().max_entries(2));
    for title in ["a", "b", "c", "d", "e"] {
        cache
            .insert(CacheKey::new(title, "d"), payload("AAAA"))
            .await;
        cache.run_pending_tasks().await;
    }
    assert!(cache.len() <= 2);
}

#[test]
fn key_separates_title_and_context() {
    // "ab" + "c" must not collide with "a" + "bc"
    assert_ne!(CacheKey::new("ab", "c"), CacheKey::new("a", "bc"));
    assert_eq!(
        CacheKey::for_request("t", "desc", Some("prompt")),
        CacheKey::new("t", "prompt")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers() {
    use std::sync::Arc;

    let cache = Arc::new(ImageCache::default());
    let mut handles = Vec::new();

    for i in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            let key = CacheKey::new(&format!("item-{i}"), "d");
            cache.insert(key, payload("AAAA")).await;
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    for i in 0..10 {
        assert!(cache.contains(&CacheKey::new(&format!("item-{i}"), "d")));
    }
}
