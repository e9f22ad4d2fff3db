//! # Recipe Manager
//!
//! [`RecipeCore`] owns everything that is shared between conversations: the
//! dataset, the fuzzy matcher, the caches, the rate-limited remote client and
//! the parallel resolver. It is built once and shared through `Arc`.
//!
//! [`RecipeManager`] is one conversation on top of a core. It owns the
//! [`SessionContext`] and runs the resolve pipeline:
//!
//! 1. extract a candidate name from the request
//! 2. recipe cache (`cache`)
//! 3. exact or fuzzy dataset lookup (`local`)
//! 4. race between the dataset and the remote service (`local` / `remote`)
//! 5. closest dataset name above the threshold (`similar`)
//!
//! Every stage that finds a recipe, except the cache itself, stores it in the
//! recipe cache under the normalized candidate name.

pub mod context;
pub mod suggest;

pub use context::SessionContext;
pub use suggest::{RecipeSummary, SuggestionCriteria, MAX_SUGGESTIONS};

use crate::cache::{BoundedCache, CacheStats};
use crate::config::ResolverConfig;
use crate::dataset::{Dataset, Recipe};
use crate::error::Result;
use crate::extractor::NameExtractor;
use crate::fuzzy::FuzzyMatcher;
use crate::lookup::{DatasetLookup, RecipeLookup, RemoteLookup, SourceTag};
use crate::rate_limit::RateLimiter;
use crate::remote::{CompletionProvider, KnowledgeClient, OpenAiCompatibleProvider};
use crate::resolver::ParallelResolver;
use crate::text::normalize;
use serde::Serialize;
use std::sync::Arc;
use suggest::Suggester;
use tracing::{debug, info};

/// A resolved recipe and where it came from
#[derive(Debug, Clone)]
pub struct Resolved {
    pub recipe: Arc<Recipe>,
    pub source: SourceTag,
}

/// Cache counters across the core
#[derive(Debug, Clone, Serialize)]
pub struct ResolverStats {
    pub recipes: CacheStats,
    pub remote_names: CacheStats,
    pub remote_recipes: CacheStats,
    pub extractions: usize,
    pub recent_remote_calls: usize,
}

/// State shared by every session
pub struct RecipeCore {
    config: ResolverConfig,
    dataset: Arc<Dataset>,
    matcher: Arc<FuzzyMatcher>,
    local: Arc<DatasetLookup>,
    remote: Arc<KnowledgeClient>,
    extractor: NameExtractor,
    resolver: ParallelResolver,
    recipe_cache: BoundedCache<Arc<Recipe>>,
}

impl RecipeCore {
    /// Core over `dataset`, calling `provider` for remote lookups if given
    pub fn new(
        dataset: Dataset,
        config: ResolverConfig,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Result<Self> {
        config.validate()?;

        let dataset = Arc::new(dataset);
        let matcher = Arc::new(FuzzyMatcher::new(config.fuzzy_memo.clone()));
        let limiter = Arc::new(RateLimiter::new(config.rate_limit));
        let remote = Arc::new(KnowledgeClient::from_config(provider, limiter, &config));

        let local = Arc::new(DatasetLookup::new(
            Arc::clone(&dataset),
            Arc::clone(&matcher),
            config.similarity_threshold,
        ));
        let resolver = ParallelResolver::with_deadline(
            Arc::clone(&local) as Arc<dyn RecipeLookup>,
            Arc::new(RemoteLookup::new(Arc::clone(&remote))),
            config.race_deadline,
        );
        let extractor = NameExtractor::new(
            Arc::clone(&dataset),
            Arc::clone(&remote),
            config.extraction_cache.clone(),
        );

        info!(
            "Recipe core ready: {} recipes, remote {}",
            dataset.len(),
            if remote.is_available() { "enabled" } else { "disabled" }
        );

        Ok(Self {
            recipe_cache: BoundedCache::new(config.recipe_cache.clone()),
            config,
            dataset,
            matcher,
            local,
            remote,
            extractor,
            resolver,
        })
    }

    /// Built-in dataset, optional provider
    pub fn builtin(
        config: ResolverConfig,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Result<Self> {
        Self::new(Dataset::builtin()?, config, provider)
    }

    /// Built-in dataset with no remote service
    pub fn offline() -> Result<Self> {
        Self::builtin(ResolverConfig::offline(), None)
    }

    /// Configuration from the environment; the remote service is used when an
    /// API key is configured
    pub fn from_env() -> Result<Self> {
        let config = ResolverConfig::from_env()?;
        let provider: Option<Arc<dyn CompletionProvider>> = if config.remote.is_enabled() {
            Some(Arc::new(OpenAiCompatibleProvider::new(&config.remote)?))
        } else {
            None
        };
        Self::builtin(config, provider)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn remote(&self) -> &Arc<KnowledgeClient> {
        &self.remote
    }

    /// Recipe details by name, without touching any session
    ///
    /// The flag is true when the recipe came from the cache or the dataset.
    pub async fn get_details(&self, name: &str) -> (Option<Arc<Recipe>>, bool) {
        let key = normalize(name);
        if key.is_empty() {
            return (None, false);
        }
        if let Some(recipe) = self.recipe_cache.get(&key) {
            return (Some(recipe), true);
        }
        if let Some(recipe) = self.local.find(name) {
            self.recipe_cache.insert(key, Arc::clone(&recipe));
            return (Some(recipe), true);
        }
        if let Some(recipe) = self.remote.fetch_recipe(name).await {
            self.recipe_cache.insert(key, Arc::clone(&recipe));
            return (Some(recipe), false);
        }
        (None, false)
    }

    /// Up to [`MAX_SUGGESTIONS`] recipes matching `criteria`, best first
    pub fn suggest(&self, criteria: &SuggestionCriteria) -> Vec<RecipeSummary> {
        let results = Suggester {
            dataset: &self.dataset,
            matcher: &self.matcher,
            threshold: self.config.similarity_threshold,
        }
        .suggest(criteria);
        debug!("{} suggestions for {:?}", results.len(), criteria);
        results
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            recipes: self.recipe_cache.stats(),
            remote_names: self.remote.name_cache_stats(),
            remote_recipes: self.remote.recipe_cache_stats(),
            extractions: self.extractor.cache_len(),
            recent_remote_calls: self.remote.limiter().recent_calls(),
        }
    }

    /// Stages 2-5 of the pipeline for an already extracted candidate
    async fn resolve_candidate(&self, candidate: &str) -> (Option<Resolved>, Vec<String>) {
        let key = normalize(candidate);

        if let Some(recipe) = self.recipe_cache.get(&key) {
            debug!("Recipe cache hit for '{}'", key);
            return (Some(Resolved { recipe, source: SourceTag::Cache }), Vec::new());
        }

        if let Some(recipe) = self.local.find(candidate) {
            return (Some(self.remember(key, recipe, SourceTag::Local)), Vec::new());
        }

        if let Some((recipe, source)) = self.resolver.fetch(candidate).await {
            return (Some(self.remember(key, recipe, source)), Vec::new());
        }

        let ranked = self.local.rank_similar(candidate);
        let names: Vec<String> = ranked.iter().map(|(r, _)| r.name.clone()).collect();
        match ranked.into_iter().next() {
            Some((recipe, score)) => {
                debug!("Closest match for '{}': {} ({:.3})", key, recipe.id, score);
                (Some(self.remember(key, recipe, SourceTag::Similar)), names)
            }
            None => (None, names),
        }
    }

    fn remember(&self, key: String, recipe: Arc<Recipe>, source: SourceTag) -> Resolved {
        self.recipe_cache.insert(key, Arc::clone(&recipe));
        Resolved { recipe, source }
    }
}

/// One conversation over a shared [`RecipeCore`]
pub struct RecipeManager {
    core: Arc<RecipeCore>,
    context: SessionContext,
}

impl RecipeManager {
    /// New session on `core`
    pub fn new(core: Arc<RecipeCore>) -> Self {
        let context = SessionContext::new();
        debug!("Starting session {}", context.session_id);
        Self { core, context }
    }

    /// Session on a core configured from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Arc::new(RecipeCore::from_env()?)))
    }

    /// Session on an offline core over the built-in dataset
    pub fn offline() -> Result<Self> {
        Ok(Self::new(Arc::new(RecipeCore::offline()?)))
    }

    /// Another session sharing this one's core
    pub fn new_session(&self) -> Self {
        Self::new(Arc::clone(&self.core))
    }

    pub fn core(&self) -> &Arc<RecipeCore> {
        &self.core
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Resolve a free-form request to a recipe
    ///
    /// `None` means nothing cleared the similarity threshold; remote failures
    /// and timeouts only show up in the logs.
    pub async fn resolve(&mut self, query: &str) -> Option<Resolved> {
        let candidate = self.core.extractor.extract(query).await;
        info!("Resolving '{}' (candidate '{}')", query.trim(), candidate);
        self.context.last_search = Some(candidate.clone());

        if candidate.trim().is_empty() {
            return None;
        }

        let (resolved, similar) = self.core.resolve_candidate(&candidate).await;
        if !similar.is_empty() {
            self.context.search_results = similar;
        }

        match &resolved {
            Some(found) => {
                info!("Resolved '{}' to {} from {}", candidate, found.recipe.id, found.source);
                self.context.current_recipe = Some(Arc::clone(&found.recipe));
            }
            None => info!("No recipe found for '{}'", candidate),
        }
        resolved
    }

    /// See [`RecipeCore::get_details`]
    pub async fn get_details(&self, name: &str) -> (Option<Arc<Recipe>>, bool) {
        self.core.get_details(name).await
    }

    /// See [`RecipeCore::suggest`]
    pub fn suggest(&self, criteria: &SuggestionCriteria) -> Vec<RecipeSummary> {
        self.core.suggest(criteria)
    }

    /// Suggestions from the session's remembered ingredients, cuisine and
    /// dietary restrictions
    pub fn suggest_for_session(&mut self) -> Vec<RecipeSummary> {
        let criteria = SuggestionCriteria {
            ingredients: self.context.available_ingredients.clone(),
            cuisine: self.context.cuisine_preference.clone(),
            restrictions: self.context.dietary_restrictions.clone(),
            ..SuggestionCriteria::default()
        };
        let results = self.core.suggest(&criteria);
        self.context.search_results = results.iter().map(|s| s.name.clone()).collect();
        results
    }

    pub fn remember_ingredients<I, S>(&mut self, ingredients: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.context.remember_ingredients(ingredients);
    }

    pub fn set_cuisine_preference(&mut self, cuisine: impl Into<String>) {
        let cuisine = cuisine.into();
        self.context.cuisine_preference = Some(cuisine).filter(|c| !c.trim().is_empty());
    }

    pub fn add_dietary_restriction(&mut self, restriction: impl Into<String>) {
        self.context.add_dietary_restriction(restriction);
    }

    pub fn reset_context(&mut self) {
        self.context.reset();
    }

    pub fn cache_stats(&self) -> ResolverStats {
        self.core.stats()
    }
}
