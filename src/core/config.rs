//! Configuration for the embedding gateway

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::core::{GatewayError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub models: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub backend: CacheBackend,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u32,
    /// Takes precedence over host/port/db when set.
    pub redis_url: Option<String>,
    pub ttl: Duration,
    pub probe_timeout: Duration,
    pub op_timeout: Duration,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model_name: String,
    pub base_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub dimension: usize,
    pub max_length: usize,
    pub batch_size: usize,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8001,
            },
            cache: CacheConfig {
                enabled: true,
                backend: CacheBackend::Redis,
                redis_host: "redis".to_string(),
                redis_port: 6379,
                redis_db: 0,
                redis_url: None,
                ttl: Duration::from_secs(3600),
                probe_timeout: Duration::from_millis(2000),
                op_timeout: Duration::from_millis(500),
                max_entries: 10_000,
            },
            models: ModelConfig {
                provider: ProviderKind::OpenAI,
                model_name: "BAAI/bge-m3".to_string(),
                base_url: None,
                api_key: None,
                dimension: 1024,
                max_length: 8192,
                batch_size: 12,
                timeout: Duration::from_secs(30),
            },
        }
    }
}

impl FromStr for CacheBackend {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(GatewayError::Config(format!("unknown cache backend: {}", other))),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(GatewayError::Config(format!("unknown embedding provider: {}", other))),
        }
    }
}

impl CacheConfig {
    pub fn redis_url(&self) -> String {
        match &self.redis_url {
            Some(url) => url.clone(),
            None => format!("redis://{}:{}/{}", self.redis_host, self.redis_port, self.redis_db),
        }
    }
}

impl ModelConfig {
    pub fn base_url(&self) -> String {
        let url = match (&self.base_url, self.provider) {
            (Some(url), _) => url.as_str(),
            (None, ProviderKind::OpenAI) => "https://api.openai.com/v1",
            (None, ProviderKind::Ollama) => "http://localhost:11434",
        };
        url.trim_end_matches('/').to_string()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from defaults overridden by whatever `lookup` yields.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("EMBEDDINGS_HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "EMBEDDINGS_PORT")? {
            config.server.port = port;
        }

        if let Some(enabled) = lookup("CACHE_ENABLED") {
            config.cache.enabled = parse_bool("CACHE_ENABLED", &enabled)?;
        }
        if let Some(backend) = parse_var(&lookup, "CACHE_BACKEND")? {
            config.cache.backend = backend;
        }
        if let Some(host) = lookup("REDIS_HOST") {
            config.cache.redis_host = host;
        }
        if let Some(port) = parse_var(&lookup, "REDIS_PORT")? {
            config.cache.redis_port = port;
        }
        if let Some(db) = parse_var(&lookup, "REDIS_DB")? {
            config.cache.redis_db = db;
        }
        if let Some(url) = lookup("REDIS_URL") {
            config.cache.redis_url = Some(url);
        }
        if let Some(secs) = parse_var(&lookup, "CACHE_TTL_SECS")? {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var(&lookup, "CACHE_PROBE_TIMEOUT_MS")? {
            config.cache.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "CACHE_OP_TIMEOUT_MS")? {
            config.cache.op_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var(&lookup, "CACHE_MAX_ENTRIES")? {
            config.cache.max_entries = max;
        }

        if let Some(provider) = parse_var(&lookup, "EMBEDDING_PROVIDER")? {
            config.models.provider = provider;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            config.models.model_name = model;
        }
        if let Some(url) = lookup("EMBEDDING_PROVIDER_URL") {
            config.models.base_url = Some(url);
        }
        if let Some(key) = lookup("EMBEDDING_API_KEY") {
            config.models.api_key = Some(key);
        }
        if let Some(dim) = parse_var(&lookup, "EMBEDDING_DIM")? {
            config.models.dimension = dim;
        }
        if let Some(max_length) = parse_var(&lookup, "EMBEDDING_MAX_LENGTH")? {
            config.models.max_length = max_length;
        }
        if let Some(batch_size) = parse_var(&lookup, "EMBEDDING_BATCH_SIZE")? {
            config.models.batch_size = batch_size;
        }
        if let Some(secs) = parse_var(&lookup, "PROVIDER_TIMEOUT_SECS")? {
            config.models.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.models.dimension == 0 {
            return Err(GatewayError::Config("EMBEDDING_DIM must be greater than zero".to_string()));
        }
        if self.models.batch_size == 0 {
            return Err(GatewayError::Config(
                "EMBEDDING_BATCH_SIZE must be greater than zero".to_string(),
            ));
        }
        if self.cache.ttl.is_zero() {
            return Err(GatewayError::Config("CACHE_TTL_SECS must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GatewayError::Config(format!("invalid {}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GatewayError::Config(format!("invalid {}={:?}: expected a boolean", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_service_contract() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.cache.redis_url(), "redis://redis:6379/0");
        assert_eq!(config.models.dimension, 1024);
        assert_eq!(config.models.batch_size, 12);
        assert_eq!(config.models.max_length, 8192);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("REDIS_HOST", "localhost"),
            ("REDIS_PORT", "6380"),
            ("CACHE_TTL_SECS", "60"),
            ("EMBEDDING_DIM", "384"),
            ("EMBEDDING_PROVIDER", "ollama"),
            ("CACHE_BACKEND", "memory"),
            ("CACHE_ENABLED", "false"),
        ]))
        .unwrap();

        assert_eq!(config.cache.redis_url(), "redis://localhost:6380/0");
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert!(!config.cache.enabled);
        assert_eq!(config.models.dimension, 384);
        assert_eq!(config.models.provider, ProviderKind::Ollama);
        assert_eq!(config.models.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_redis_url_overrides_host_and_port() {
        let config = Config::from_lookup(lookup_from(&[
            ("REDIS_HOST", "ignored"),
            ("REDIS_URL", "redis://cache.internal:7000/2"),
        ]))
        .unwrap();
        assert_eq!(config.cache.redis_url(), "redis://cache.internal:7000/2");
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[("REDIS_PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, GatewayError::Config(msg) if msg.contains("REDIS_PORT")));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = Config::from_lookup(lookup_from(&[("EMBEDDING_DIM", "0")])).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = Config::from_lookup(lookup_from(&[(
            "EMBEDDING_PROVIDER_URL",
            "http://tei.local:8080/v1/",
        )]))
        .unwrap();
        assert_eq!(config.models.base_url(), "http://tei.local:8080/v1");
    }
}
