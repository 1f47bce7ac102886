//! Tests for the embedding cache adapter's degradation behaviour

use super::{CacheStore, EmbeddingCache, MemoryStore};
use crate::core::{CacheBackend, CacheConfig, CacheKey, Config, GatewayError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const STARTUP: Duration = Duration::from_millis(200);
const OP: Duration = Duration::from_millis(50);
const TTL: Duration = Duration::from_secs(3600);

/// Store that accepts the startup ping but fails every later call.
struct BrokenStore {
    calls: AtomicUsize,
}

#[async_trait]
impl CacheStore for BrokenStore {
    fn name(&self) -> &str {
        "broken"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GatewayError::Io(std::io::Error::other("connection reset")))
    }

    async fn set_ex(&self, _key: &[u8], _value: &[u8], _ttl: Duration) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GatewayError::Io(std::io::Error::other("connection reset")))
    }
}

/// Store whose startup ping fails; nothing after it should ever be called.
struct UnreachableStore {
    calls: AtomicUsize,
}

#[async_trait]
impl CacheStore for UnreachableStore {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn ping(&self) -> Result<()> {
        Err(GatewayError::Io(std::io::Error::other("connection refused")))
    }

    async fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn set_ex(&self, _key: &[u8], _value: &[u8], _ttl: Duration) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store that never answers after the startup ping.
struct HangingStore;

#[async_trait]
impl CacheStore for HangingStore {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>> {
        std::future::pending().await
    }

    async fn set_ex(&self, _key: &[u8], _value: &[u8], _ttl: Duration) -> Result<()> {
        std::future::pending().await
    }
}

async fn memory_cache() -> (Arc<MemoryStore>, EmbeddingCache) {
    let store = Arc::new(MemoryStore::new(100));
    let cache = EmbeddingCache::with_store(store.clone(), STARTUP, OP).await;
    (store, cache)
}

#[tokio::test]
async fn test_put_then_get_returns_vector() {
    let (_, cache) = memory_cache().await;
    let key = CacheKey::for_text("hello");

    assert!(cache.is_enabled());
    assert_eq!(cache.get(&key).await, None);

    cache.put(&key, &[0.25, -0.5, 1.0], TTL).await;
    assert_eq!(cache.get(&key).await, Some(vec![0.25, -0.5, 1.0]));
}

#[tokio::test]
async fn test_repeated_put_is_idempotent() {
    let (store, cache) = memory_cache().await;
    let key = CacheKey::for_text("same");

    cache.put(&key, &[1.0, 2.0], TTL).await;
    cache.put(&key, &[1.0, 2.0], TTL).await;

    assert_eq!(store.len(), 1);
    assert_eq!(cache.get(&key).await, Some(vec![1.0, 2.0]));
}

#[tokio::test]
async fn test_corrupt_entry_reads_as_miss() {
    let (store, cache) = memory_cache().await;
    let key = CacheKey::for_text("corrupt");
    store.insert_raw(key.as_bytes(), b"\x80\x04not-json", TTL);

    assert_eq!(cache.get(&key).await, None);
    // Never repaired or deleted by the adapter.
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_store_errors_are_absorbed() {
    let store = Arc::new(BrokenStore {
        calls: AtomicUsize::new(0),
    });
    let cache = EmbeddingCache::with_store(store.clone(), STARTUP, OP).await;
    let key = CacheKey::for_text("x");

    assert!(cache.is_enabled());
    assert_eq!(cache.get(&key).await, None);
    cache.put(&key, &[1.0], TTL).await;
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_startup_ping_disables_cache() {
    let store = Arc::new(UnreachableStore {
        calls: AtomicUsize::new(0),
    });
    let cache = EmbeddingCache::with_store(store.clone(), STARTUP, OP).await;
    let key = CacheKey::for_text("x");

    assert!(!cache.is_enabled());
    cache.put(&key, &[1.0], TTL).await;
    assert_eq!(cache.get(&key).await, None);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_hanging_store_times_out_to_miss() {
    let cache = EmbeddingCache::with_store(Arc::new(HangingStore), STARTUP, OP).await;
    let key = CacheKey::for_text("slow");

    assert_eq!(cache.get(&key).await, None);
    cache.put(&key, &[1.0], TTL).await;
}

#[tokio::test]
async fn test_connect_respects_disabled_flag() {
    let mut config: CacheConfig = Config::default().cache;
    config.enabled = false;
    assert!(!EmbeddingCache::connect(&config).await.is_enabled());
}

#[tokio::test]
async fn test_connect_memory_backend() {
    let mut config: CacheConfig = Config::default().cache;
    config.backend = CacheBackend::Memory;
    assert!(EmbeddingCache::connect(&config).await.is_enabled());
}

#[tokio::test]
async fn test_connect_unreachable_redis_degrades() {
    let mut config: CacheConfig = Config::default().cache;
    // Port 1 on loopback refuses connections.
    config.redis_url = Some("redis://127.0.0.1:1/0".to_string());
    config.probe_timeout = Duration::from_millis(500);

    let cache = EmbeddingCache::connect(&config).await;
    assert!(!cache.is_enabled());
    assert_eq!(cache.get(&CacheKey::for_text("x")).await, None);
}
