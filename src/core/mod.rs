//! Core functionality for the embedding gateway

pub mod cache_key;
pub mod config;
pub mod error;

pub use cache_key::CacheKey;
pub use config::{CacheBackend, CacheConfig, Config, ModelConfig, ProviderKind, ServerConfig};
pub use error::{GatewayError, Result};
