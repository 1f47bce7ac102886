//! Prometheus metrics for the cache gateway

use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};
use serde::Serialize;

use crate::core::{GatewayError, Result};

/// Counters and timings for one gateway instance.
pub struct GatewayStats {
    /// Counter tracking cache lookups that returned a usable vector
    pub cache_hits: IntCounter,
    /// Counter tracking cache lookups that fell through to the provider
    pub cache_misses: IntCounter,
    /// Counter tracking embedding provider calls
    pub provider_calls: IntCounter,
    /// Histogram tracking embedding provider call duration
    pub provider_duration: Histogram,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub provider_calls: u64,
}

impl GatewayStats {
    pub fn new() -> Self {
        // Names and help strings are constants, so construction cannot fail.
        let cache_hits = IntCounter::with_opts(Opts::new(
            "cache_hits_total",
            "Total number of embedding cache hits",
        ))
        .expect("Failed to create cache_hits counter");

        let cache_misses = IntCounter::with_opts(Opts::new(
            "cache_misses_total",
            "Total number of embedding cache misses",
        ))
        .expect("Failed to create cache_misses counter");

        let provider_calls = IntCounter::with_opts(Opts::new(
            "provider_calls_total",
            "Total number of embedding provider calls",
        ))
        .expect("Failed to create provider_calls counter");

        let provider_duration = Histogram::with_opts(
            HistogramOpts::new(
                "provider_call_duration_seconds",
                "Duration of embedding provider calls in seconds",
            )
            .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )
        .expect("Failed to create provider_duration histogram");

        Self {
            cache_hits,
            cache_misses,
            provider_calls,
            provider_duration,
        }
    }

    /// Register metrics with a Prometheus registry
    pub fn register(&self, registry: &Registry) -> Result<()> {
        registry
            .register(Box::new(self.cache_hits.clone()))
            .map_err(|e| GatewayError::Config(format!("Failed to register cache_hits: {}", e)))?;

        registry
            .register(Box::new(self.cache_misses.clone()))
            .map_err(|e| GatewayError::Config(format!("Failed to register cache_misses: {}", e)))?;

        registry
            .register(Box::new(self.provider_calls.clone()))
            .map_err(|e| GatewayError::Config(format!("Failed to register provider_calls: {}", e)))?;

        registry
            .register(Box::new(self.provider_duration.clone()))
            .map_err(|e| {
                GatewayError::Config(format!("Failed to register provider_duration: {}", e))
            })?;

        Ok(())
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.cache_hits.get(),
            misses: self.cache_misses.get(),
            provider_calls: self.provider_calls.get(),
        }
    }
}

impl Default for GatewayStats {
    fn default() -> Self {
        Self::new()
    }
}
