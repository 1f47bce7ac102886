//! Key-value stores and the embedding cache built on top of them

pub mod cache;
pub mod memory;
pub mod redis;

#[cfg(test)]
mod cache_test;

pub use cache::EmbeddingCache;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

use crate::core::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Binary-safe key-value store with per-key expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    fn name(&self) -> &str;

    /// Connectivity check run once at startup.
    async fn ping(&self) -> Result<()>;

    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    async fn set_ex(&self, key: &[u8], value: &[u8], ttl: Duration) -> Result<()>;
}
