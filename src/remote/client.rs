//! Remote knowledge client
//!
//! Guards every completion call the same way: response cache, then the shared
//! rate limiter, then a bounded retry loop. Failures never leave this module as
//! errors; they are logged and reported as `None`.

use super::document::parse_recipe_document;
use super::provider::{CompletionProvider, CompletionRequest};
use super::retry::RetryPolicy;
use crate::cache::{BoundedCache, CacheConfig, CacheStats};
use crate::config::ResolverConfig;
use crate::dataset::Recipe;
use crate::error::{RecipeError, Result};
use crate::rate_limit::{Admission, RateLimiter};
use crate::text::normalize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Rate-limited, cached, retrying access to the completion service
pub struct KnowledgeClient {
    provider: Option<Arc<dyn CompletionProvider>>,
    limiter: Arc<RateLimiter>,
    name_cache: BoundedCache<String>,
    recipe_cache: BoundedCache<Arc<Recipe>>,
    name_retry: RetryPolicy,
    recipe_retry: RetryPolicy,
}

impl KnowledgeClient {
    /// Client over `provider` with default caches and retry policies
    pub fn new(provider: Arc<dyn CompletionProvider>, limiter: Arc<RateLimiter>) -> Self {
        Self::build(Some(provider), limiter, &ResolverConfig::default())
    }

    /// Client that never calls out; every fetch returns `None`
    pub fn disabled(limiter: Arc<RateLimiter>) -> Self {
        Self::build(None, limiter, &ResolverConfig::default())
    }

    /// Client configured from a [`ResolverConfig`]
    pub fn from_config(
        provider: Option<Arc<dyn CompletionProvider>>,
        limiter: Arc<RateLimiter>,
        config: &ResolverConfig,
    ) -> Self {
        Self::build(provider, limiter, config)
    }

    fn build(
        provider: Option<Arc<dyn CompletionProvider>>,
        limiter: Arc<RateLimiter>,
        config: &ResolverConfig,
    ) -> Self {
        match &provider {
            Some(p) => info!("Remote knowledge client enabled (provider: {})", p.name()),
            None => info!("Remote knowledge client disabled"),
        }

        Self {
            provider,
            limiter,
            name_cache: BoundedCache::new(config.remote_cache.clone()),
            recipe_cache: BoundedCache::new(config.remote_cache.clone()),
            name_retry: config.extraction_retry,
            recipe_retry: config.recipe_retry,
        }
    }

    /// Override both retry policies
    pub fn with_retry_policies(mut self, name_retry: RetryPolicy, recipe_retry: RetryPolicy) -> Self {
        self.name_retry = name_retry;
        self.recipe_retry = recipe_retry;
        self
    }

    /// Replace the response caches with ones built from `config`
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.name_cache = BoundedCache::new(config.clone());
        self.recipe_cache = BoundedCache::new(config);
        self
    }

    /// Whether a provider is configured
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Ask the service for the recipe name inside free text
    pub async fn fetch_name(&self, text: &str) -> Option<String> {
        let key = normalize(text);
        if key.is_empty() {
            return None;
        }
        if let Some(name) = self.name_cache.get(&key) {
            debug!("Remote name cache hit for '{}'", key);
            return Some(name);
        }

        let provider = self.admitted_provider("name extraction")?;
        let request = CompletionRequest::name_extraction(text);

        let result = self
            .name_retry
            .run("remote name extraction", || async {
                let raw = provider.complete(&request).await?;
                clean_name(&raw).ok_or_else(|| {
                    RecipeError::MalformedResponse("empty name completion".to_string())
                })
            })
            .await;

        match result {
            Ok(name) => {
                debug!("Remote service extracted '{}' from '{}'", name, key);
                self.name_cache.insert(key, name.clone());
                Some(name)
            }
            Err(e) => {
                error!("Remote name extraction failed for '{}': {}", key, e);
                None
            }
        }
    }

    /// Ask the service for a full recipe document
    pub async fn fetch_recipe(&self, name: &str) -> Option<Arc<Recipe>> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        if let Some(recipe) = self.recipe_cache.get(&key) {
            debug!("Remote recipe cache hit for '{}'", key);
            return Some(recipe);
        }

        let provider = self.admitted_provider("recipe fetch")?;
        let request = CompletionRequest::recipe_document(name.trim());

        let result: Result<Recipe> = self
            .recipe_retry
            .run("remote recipe fetch", || async {
                let raw = provider.complete(&request).await?;
                parse_recipe_document(&raw)
            })
            .await;

        match result {
            Ok(recipe) => {
                info!("Fetched remote recipe '{}' ({})", recipe.name, recipe.id);
                let recipe = Arc::new(recipe);
                self.recipe_cache.insert(key, Arc::clone(&recipe));
                Some(recipe)
            }
            Err(e) => {
                error!("Remote recipe fetch failed for '{}': {}", key, e);
                None
            }
        }
    }

    /// The provider, if one is configured and the rate limiter admits a call
    fn admitted_provider(&self, operation: &str) -> Option<&Arc<dyn CompletionProvider>> {
        let Some(provider) = self.provider.as_ref() else {
            debug!("Skipping remote {}: client disabled", operation);
            return None;
        };
        match self.limiter.admit() {
            Admission::Allowed => Some(provider),
            Admission::Denied { .. } => {
                warn!("Skipping remote {}: rate limited", operation);
                None
            }
        }
    }

    pub fn name_cache_stats(&self) -> CacheStats {
        self.name_cache.stats()
    }

    pub fn recipe_cache_stats(&self) -> CacheStats {
        self.recipe_cache.stats()
    }
}

/// First line of a name completion without quotes or trailing punctuation
fn clean_name(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let name = line.trim_matches(|c: char| {
        matches!(c, '"' | '\'' | '`' | '*' | '.') || c.is_whitespace()
    });
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimitConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CannedProvider {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedProvider {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn client(provider: Arc<CannedProvider>, limit: usize) -> KnowledgeClient {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            limit,
            window: Duration::from_secs(60),
        }));
        KnowledgeClient::new(provider, limiter)
            .with_retry_policies(RetryPolicy::immediate(2), RetryPolicy::immediate(2))
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("\"Paneer Tikka\".\n"), Some("Paneer Tikka".to_string()));
        assert_eq!(clean_name("\n\n  Biryani  "), Some("Biryani".to_string()));
        assert_eq!(clean_name("**Pad Thai**"), Some("Pad Thai".to_string()));
        assert_eq!(clean_name("'Chole Bhature' ."), Some("Chole Bhature".to_string()));
        assert_eq!(clean_name("\"\"."), None);
        assert_eq!(clean_name("  \n "), None);
    }

    #[tokio::test]
    async fn test_disabled_client_returns_none() {
        let client = KnowledgeClient::disabled(Arc::new(RateLimiter::default()));
        assert!(!client.is_available());
        assert!(client.fetch_name("anything at all").await.is_none());
        assert!(client.fetch_recipe("pad thai").await.is_none());
        assert_eq!(client.limiter().recent_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_name_is_cached() {
        let provider = CannedProvider::new("Paneer Tikka");
        let client = client(Arc::clone(&provider), 10);

        assert_eq!(
            client.fetch_name("please show me paneer tikka").await.as_deref(),
            Some("Paneer Tikka")
        );
        assert_eq!(
            client.fetch_name("Please show me paneer tikka ").await.as_deref(),
            Some("Paneer Tikka")
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.name_cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_malformed_document_uses_both_attempts() {
        let provider = CannedProvider::new("I cannot help with that.");
        let client = client(Arc::clone(&provider), 10);

        assert!(client.fetch_recipe("pad thai").await.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        // one admission per fetch, not per attempt
        assert_eq!(client.limiter().recent_calls(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_denial_skips_the_call() {
        let provider = CannedProvider::new(r#"{"name": "Pad Thai", "steps": ["Cook"]}"#);
        let client = client(Arc::clone(&provider), 1);

        assert!(client.fetch_recipe("pad thai").await.is_some());
        assert!(client.fetch_recipe("green curry").await.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // cached answers do not need an admission
        assert!(client.fetch_recipe("Pad Thai").await.is_some());
    }
}
