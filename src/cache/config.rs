//! Configuration for bounded caches

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`BoundedCache`](crate::cache::BoundedCache)
///
/// Capacity is counted in entries. TTL is fixed per entry at insertion time;
/// with a non-zero jitter each entry gets a slightly different TTL so that a
/// burst of inserts does not expire as one block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for cache entries
    pub default_ttl: Duration,

    /// Maximum number of entries in the cache
    pub max_entries: usize,

    /// TTL jitter factor (0.0 - 1.0)
    pub ttl_jitter: f64,

    /// Enable hit/miss/eviction counters
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            max_entries: 100,
            ttl_jitter: 0.0,
            enable_metrics: true,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }

        if self.default_ttl.is_zero() {
            return Err("default_ttl must be greater than 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.ttl_jitter) {
            return Err("ttl_jitter must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }

    /// TTL for one new entry
    ///
    /// Jitter only ever shortens the TTL: the result lies in
    /// `[default_ttl * (1 - ttl_jitter), default_ttl]`.
    pub fn ttl_with_jitter(&self) -> Duration {
        if self.ttl_jitter == 0.0 {
            return self.default_ttl;
        }

        let base_secs = self.default_ttl.as_secs_f64();
        let cut = rand::random::<f64>() * self.ttl_jitter * base_secs;
        let final_secs = (base_secs - cut).max(0.001).min(base_secs);

        Duration::from_secs_f64(final_secs)
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    default_ttl: Option<Duration>,
    max_entries: Option<usize>,
    ttl_jitter: Option<f64>,
    enable_metrics: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set default TTL for cache entries
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set maximum number of cache entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set TTL jitter factor (0.0 - 1.0)
    pub fn ttl_jitter(mut self, jitter: f64) -> Self {
        self.ttl_jitter = Some(jitter);
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            ttl_jitter: self.ttl_jitter.unwrap_or(defaults.ttl_jitter),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
        }
    }
}

/// Preset configurations for the caches the resolver owns
impl CacheConfig {
    /// Resolved recipes keyed by normalized candidate name
    pub fn recipes() -> Self {
        Self {
            default_ttl: Duration::from_secs(60 * 60),
            max_entries: 100,
            ..Default::default()
        }
    }

    /// Raw remote responses (names and recipe documents)
    pub fn remote_responses() -> Self {
        Self {
            default_ttl: Duration::from_secs(30 * 60),
            max_entries: 50,
            ttl_jitter: 0.1,
            ..Default::default()
        }
    }

    /// Extracted names keyed by normalized request text
    pub fn extractions() -> Self {
        Self {
            default_ttl: Duration::from_secs(60 * 60),
            max_entries: 256,
            ..Default::default()
        }
    }

    /// Memo table for pairwise similarity scores
    pub fn fuzzy_memo() -> Self {
        Self {
            default_ttl: Duration::from_secs(24 * 3600),
            max_entries: 128,
            enable_metrics: false,
            ..Default::default()
        }
    }
}
