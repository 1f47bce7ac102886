//! Error types for the embedding gateway

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Embedding provider call failed: {0}")]
    Provider(String),

    #[error("Embedding provider timed out after {0:?}")]
    ProviderTimeout(Duration),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache operation timed out after {0:?}")]
    CacheTimeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Maps a `reqwest` failure onto the provider taxonomy, keeping timeouts distinct.
    pub fn from_provider(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            GatewayError::ProviderTimeout(timeout)
        } else {
            GatewayError::Provider(err.to_string())
        }
    }

    pub fn is_provider_failure(&self) -> bool {
        matches!(self, GatewayError::Provider(_) | GatewayError::ProviderTimeout(_))
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
