//! Cache gateway: resolves text to embeddings through the cache and the provider
//!
//! Single texts short-circuit to `None` when empty. Batches keep every position:
//! empty or whitespace-only entries are embedded as a single space, cache hits are
//! placed directly, and all misses go to the provider in one call whose output is
//! mapped back onto the original indices.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use crate::core::{CacheKey, Config, Result};
use crate::models::{EmbedOptions, EmbeddingModel};
use crate::storage::EmbeddingCache;

pub mod metrics;


pub use metrics::{GatewayStats, StatsSnapshot};

/// One optional vector per input text, index-aligned with the input.
pub type BatchResult = Vec<Option<Vec<f32>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEmbedding {
    pub vector: Vec<f32>,
    pub status: CacheStatus,
}

impl ResolvedEmbedding {
    pub fn cached(&self) -> bool {
        self.status == CacheStatus::Hit
    }
}

/// Fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct GatewaySettings {
    pub dimension: usize,
    pub ttl: Duration,
    pub max_length: usize,
    pub batch_size: usize,
}

impl From<&Config> for GatewaySettings {
    fn from(config: &Config) -> Self {
        Self {
            dimension: config.models.dimension,
            ttl: config.cache.ttl,
            max_length: config.models.max_length,
            batch_size: config.models.batch_size,
        }
    }
}

pub struct CacheGateway {
    model: Arc<dyn EmbeddingModel>,
    cache: Arc<EmbeddingCache>,
    settings: GatewaySettings,
    stats: GatewayStats,
}

impl CacheGateway {
    pub fn new(
        model: Arc<dyn EmbeddingModel>,
        cache: Arc<EmbeddingCache>,
        settings: GatewaySettings,
    ) -> Self {
        if model.dimension() != settings.dimension {
            tracing::warn!(
                "Provider {} declares dimension {} but gateway expects {}",
                model.name(),
                model.dimension(),
                settings.dimension
            );
        }
        Self {
            model,
            cache,
            settings,
            stats: GatewayStats::new(),
        }
    }

    pub fn model(&self) -> &Arc<dyn EmbeddingModel> {
        &self.model
    }

    pub fn dimension(&self) -> usize {
        self.settings.dimension
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn metrics(&self) -> &GatewayStats {
        &self.stats
    }

    /// Resolves one text. Empty or whitespace-only input returns `None` without
    /// touching the cache or the provider.
    pub async fn resolve_one(&self, text: &str) -> Result<Option<ResolvedEmbedding>> {
        let Some(normalized) = normalize_single(text) else {
            return Ok(None);
        };

        let key = CacheKey::for_text(normalized);
        if let Some(vector) = self.lookup(&key).await {
            return Ok(Some(ResolvedEmbedding {
                vector,
                status: CacheStatus::Hit,
            }));
        }

        let options = EmbedOptions {
            max_length: self.settings.max_length,
            batch_size: 1,
        };
        let vectors = self.call_provider(vec![normalized.to_string()], options).await?;

        let Some(vector) = vectors.into_iter().next().filter(|v| self.is_valid(v)) else {
            debug!("Provider returned no usable vector for single text");
            return Ok(None);
        };

        self.cache.put(&key, &vector, self.settings.ttl).await;
        Ok(Some(ResolvedEmbedding {
            vector,
            status: CacheStatus::Miss,
        }))
    }

    /// Resolves a batch, keeping output index-aligned with `texts`.
    ///
    /// Cache misses are embedded with exactly one provider call. A provider failure
    /// fails the whole batch; an invalid vector only blanks its own index.
    pub async fn resolve_batch(&self, texts: &[String]) -> Result<BatchResult> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let normalized: Vec<String> = texts.iter().map(|t| normalize_batch_text(t)).collect();
        let keys: Vec<CacheKey> = normalized.iter().map(|t| CacheKey::for_text(t)).collect();

        let cached = join_all(keys.iter().map(|key| self.lookup(key))).await;

        let mut results: BatchResult = Vec::with_capacity(texts.len());
        let mut pending_indices = Vec::new();
        let mut pending_texts = Vec::new();
        for (index, hit) in cached.into_iter().enumerate() {
            if hit.is_none() {
                pending_indices.push(index);
                pending_texts.push(normalized[index].clone());
            }
            results.push(hit);
        }

        debug!(
            "Batch of {}: {} cache hits, {} misses",
            texts.len(),
            texts.len() - pending_indices.len(),
            pending_indices.len()
        );

        if pending_texts.is_empty() {
            return Ok(results);
        }

        let options = EmbedOptions {
            max_length: self.settings.max_length,
            batch_size: self.settings.batch_size,
        };
        let vectors = self.call_provider(pending_texts, options).await?;

        let mut writes = Vec::new();
        for (index, vector) in pending_indices.into_iter().zip(vectors) {
            if self.is_valid(&vector) {
                results[index] = Some(vector);
                writes.push(index);
            } else {
                debug!("Discarding vector of length {} at index {}", vector.len(), index);
            }
        }

        join_all(writes.into_iter().map(|index| {
            let vector = results[index].as_deref().unwrap_or_default();
            self.cache.put(&keys[index], vector, self.settings.ttl)
        }))
        .await;

        Ok(results)
    }

    async fn lookup(&self, key: &CacheKey) -> Option<Vec<f32>> {
        let hit = self.cache.get(key).await.filter(|v| self.is_valid(v));
        if hit.is_some() {
            self.stats.cache_hits.inc();
        } else {
            self.stats.cache_misses.inc();
        }
        hit
    }

    async fn call_provider(&self, texts: Vec<String>, options: EmbedOptions) -> Result<Vec<Vec<f32>>> {
        self.stats.provider_calls.inc();
        let _timer = self.stats.provider_duration.start_timer();
        let count = texts.len();
        self.model.generate_batch(texts, options).await.map_err(|e| {
            tracing::error!("Embedding provider failed for {} texts: {}", count, e);
            e
        })
    }

    fn is_valid(&self, vector: &[f32]) -> bool {
        vector.len() == self.settings.dimension
    }
}

/// Trimmed text, or `None` if nothing is left.
pub fn normalize_single(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Trimmed text, or a single space if nothing is left.
pub fn normalize_batch_text(text: &str) -> String {
    normalize_single(text).unwrap_or(" ").to_string()
}
