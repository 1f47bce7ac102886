//! Embedding Gateway Library
//!
//! Serves dense text embeddings from an upstream provider, with a content-addressed
//! Redis cache in front of it.

pub mod api;
pub mod core;
pub mod gateway;
pub mod models;
pub mod storage;

use std::sync::Arc;

use prometheus::Registry;

use crate::core::{Config, Result};
use crate::gateway::{CacheGateway, GatewaySettings};
use crate::models::EmbeddingModel;
use crate::storage::EmbeddingCache;

// Application state for Axum
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<CacheGateway>,
    pub registry: Arc<Registry>,
}

pub struct EmbeddingGatewayService {
    pub config: Config,
    pub gateway: Arc<CacheGateway>,
    pub registry: Arc<Registry>,
}

impl EmbeddingGatewayService {
    /// Connects the cache and builds the configured provider. An unreachable cache
    /// does not fail startup.
    pub async fn new(config: Config) -> Result<Self> {
        let model = models::build_model(&config.models)?;
        Self::with_model(config, model).await
    }

    pub async fn with_model(config: Config, model: Arc<dyn EmbeddingModel>) -> Result<Self> {
        let cache = Arc::new(EmbeddingCache::connect(&config.cache).await);
        let gateway = Arc::new(CacheGateway::new(model, cache, GatewaySettings::from(&config)));

        let registry = Arc::new(Registry::new());
        gateway.metrics().register(&registry)?;

        Ok(Self {
            config,
            gateway,
            registry,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            gateway: self.gateway.clone(),
            registry: self.registry.clone(),
        }
    }
}
