//! Embedding cache adapter
//!
//! Wraps a [`CacheStore`] behind two total operations: [`EmbeddingCache::get`] never
//! fails (any store problem reads as a miss) and [`EmbeddingCache::put`] never
//! reports failure. A store that fails its startup probe disables the cache for the
//! rest of the process lifetime, so the gateway keeps serving through the provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::{CacheBackend, CacheConfig, CacheKey, GatewayError, Result};
use crate::storage::{CacheStore, MemoryStore, RedisStore};

pub struct EmbeddingCache {
    store: Option<Arc<dyn CacheStore>>,
    op_timeout: Duration,
}

impl EmbeddingCache {
    /// Builds the configured store and probes it once.
    pub async fn connect(config: &CacheConfig) -> Self {
        if !config.enabled {
            info!("Embedding cache disabled by configuration");
            return Self::disabled();
        }

        match config.backend {
            CacheBackend::Memory => {
                let store = Arc::new(MemoryStore::new(config.max_entries));
                Self::with_store(store, config.probe_timeout, config.op_timeout).await
            }
            CacheBackend::Redis => {
                let url = config.redis_url();
                let connected =
                    tokio::time::timeout(config.probe_timeout, RedisStore::connect(&url)).await;

                match connected {
                    Ok(Ok(store)) => {
                        Self::with_store(Arc::new(store), config.probe_timeout, config.op_timeout)
                            .await
                    }
                    Ok(Err(e)) => {
                        warn!("Redis cache unavailable at {}: {}", url, e);
                        Self::disabled()
                    }
                    Err(_) => {
                        warn!(
                            "Redis cache unavailable at {}: connect timed out after {:?}",
                            url, config.probe_timeout
                        );
                        Self::disabled()
                    }
                }
            }
        }
    }

    /// Wraps an existing store, disabling the cache if the probe fails.
    pub async fn with_store(
        store: Arc<dyn CacheStore>,
        probe_timeout: Duration,
        op_timeout: Duration,
    ) -> Self {
        match bounded(probe_timeout, store.ping()).await {
            Ok(()) => {
                info!("Embedding cache connected ({})", store.name());
                Self {
                    store: Some(store),
                    op_timeout,
                }
            }
            Err(e) => {
                warn!("Embedding cache probe failed ({}): {}", store.name(), e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            store: None,
            op_timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Returns the cached vector for `key`, or `None` on a miss, a store failure, or
    /// an unreadable payload.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<f32>> {
        let store = self.store.as_ref()?;

        let bytes = match bounded(self.op_timeout, store.get(key.as_bytes())).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read error for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice::<Vec<f32>>(&bytes) {
            Ok(vector) => Some(vector),
            Err(e) => {
                debug!("Ignoring undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Stores `vector` under `key` with `ttl`. Failures are logged and dropped.
    pub async fn put(&self, key: &CacheKey, vector: &[f32], ttl: Duration) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let payload = match serde_json::to_vec(vector) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Cache write error for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = bounded(self.op_timeout, store.set_ex(key.as_bytes(), &payload, ttl)).await {
            warn!("Cache write error for {}: {}", key, e);
        }
    }
}

async fn bounded<T>(limit: Duration, op: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, op)
        .await
        .map_err(|_| GatewayError::CacheTimeout(limit))?
}
