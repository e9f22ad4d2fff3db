//! Resolver configuration
//!
//! Everything has a working default; [`ResolverConfig::from_env`] layers
//! environment variables (and a `.env` file, if present) on top.

use crate::cache::CacheConfig;
use crate::error::{RecipeError, Result};
use crate::rate_limit::RateLimitConfig;
use crate::remote::RetryPolicy;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "RECIPE_LLM_BASE_URL";
pub const MODEL_ENV: &str = "RECIPE_LLM_MODEL";
pub const TIMEOUT_ENV: &str = "RECIPE_LLM_TIMEOUT_SECS";
pub const RATE_LIMIT_ENV: &str = "RECIPE_RATE_LIMIT_PER_MINUTE";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the remote completion service
#[derive(Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    /// No key means the remote client is disabled
    pub api_key: Option<String>,
    pub model: String,
    pub request_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl RemoteConfig {
    /// Read remote settings from the environment
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_url: env_string(BASE_URL_ENV).unwrap_or(defaults.base_url),
            api_key: env_string(API_KEY_ENV),
            model: env_string(MODEL_ENV).unwrap_or(defaults.model),
            request_timeout: env_parse::<u64>(TIMEOUT_ENV)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Top-level configuration for a [`RecipeCore`](crate::manager::RecipeCore)
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Resolved recipes keyed by normalized candidate name
    pub recipe_cache: CacheConfig,
    /// Remote responses (names and recipe documents)
    pub remote_cache: CacheConfig,
    /// Extracted names keyed by normalized request text
    pub extraction_cache: CacheConfig,
    /// Memoized fuzzy scores
    pub fuzzy_memo: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub extraction_retry: RetryPolicy,
    pub recipe_retry: RetryPolicy,
    /// How long the local/remote race may take
    pub race_deadline: Duration,
    /// Minimum fuzzy score (exclusive) for a name to count as a match
    pub similarity_threshold: f64,
    pub remote: RemoteConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            recipe_cache: CacheConfig::recipes(),
            remote_cache: CacheConfig::remote_responses(),
            extraction_cache: CacheConfig::extractions(),
            fuzzy_memo: CacheConfig::fuzzy_memo(),
            rate_limit: RateLimitConfig::default(),
            extraction_retry: RetryPolicy::extraction(),
            recipe_retry: RetryPolicy::recipe_fetch(),
            race_deadline: Duration::from_secs(5),
            similarity_threshold: 0.6,
            remote: RemoteConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Defaults plus environment overrides; loads `.env` first
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self {
            remote: RemoteConfig::from_env()?,
            ..Self::default()
        };
        if let Some(limit) = env_parse::<usize>(RATE_LIMIT_ENV)? {
            config.rate_limit = RateLimitConfig::per_minute(limit);
        }

        config.validate()?;
        Ok(config)
    }

    /// Configuration with the remote client switched off
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, cache) in [
            ("recipe_cache", &self.recipe_cache),
            ("remote_cache", &self.remote_cache),
            ("extraction_cache", &self.extraction_cache),
            ("fuzzy_memo", &self.fuzzy_memo),
        ] {
            cache
                .validate()
                .map_err(|e| RecipeError::ConfigError(format!("{}: {}", name, e)))?;
        }

        if self.rate_limit.limit == 0 {
            return Err(RecipeError::ConfigError(
                "rate limit must allow at least one call".to_string(),
            ));
        }
        if self.rate_limit.window.is_zero() {
            return Err(RecipeError::ConfigError(
                "rate limit window must be greater than 0".to_string(),
            ));
        }
        if self.extraction_retry.max_attempts == 0 || self.recipe_retry.max_attempts == 0 {
            return Err(RecipeError::ConfigError(
                "retry policies need at least one attempt".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(RecipeError::ConfigError(
                "similarity_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.race_deadline.is_zero() {
            return Err(RecipeError::ConfigError(
                "race_deadline must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| RecipeError::ConfigError(format!("{} has an invalid value: {}", key, raw))),
    }
}
