//! # Recipe Resolver (recipe-resolver)
//!
//! Turns free-form recipe requests into structured recipe records and ranks
//! recipes against multi-criteria filters.
//!
//! ## Features
//!
//! - Built-in recipe dataset with inverted ingredient/cuisine/difficulty indices
//! - Memoized Ratcliff/Obershelp fuzzy matching
//! - Bounded caches with TTL expiry and oldest-first eviction
//! - Sliding-window rate limiting for remote calls
//! - Remote completion service access with bounded retry and lenient parsing
//! - Deadline-bounded race between local and remote lookups
//! - Per-session conversational context over a shared core
//!
//! ## Resolving a request
//!
//! ```no_run
//! use recipe_resolver::RecipeManager;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut manager = RecipeManager::from_env()?;
//!
//!     if let Some(resolved) = manager.resolve("how do I make dal makhani").await {
//!         println!("{} ({})", resolved.recipe.name, resolved.source);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Suggestions
//!
//! ```no_run
//! use recipe_resolver::{RecipeManager, SuggestionCriteria};
//!
//! # fn main() -> anyhow::Result<()> {
//! let manager = RecipeManager::offline()?;
//! let criteria = SuggestionCriteria::new()
//!     .with_ingredients(["chicken", "tomato"])
//!     .with_spice_level("Medium");
//!
//! for summary in manager.suggest(&criteria) {
//!     println!("{:5.1}  {}", summary.score, summary.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Sessions
//!
//! A [`RecipeCore`] holds the dataset, caches, rate limiter and remote client
//! and is shared through `Arc`. Each [`RecipeManager`] is one conversation on
//! top of it; [`RecipeManager::new_session`] opens another on the same core.
//!
//! ## Failure model
//!
//! Only dataset and configuration problems are errors, and only at
//! construction. Remote failures, rate-limit denials and timeouts are logged
//! and show up as absent results.

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extractor;
pub mod fuzzy;
pub mod lookup;
pub mod manager;
pub mod rate_limit;
pub mod remote;
pub mod resolver;
pub mod text;

// Re-export main types for convenience
pub use cache::{BoundedCache, CacheConfig, CacheConfigBuilder, CacheEntry, CacheKey, CacheStats};
pub use config::{RemoteConfig, ResolverConfig};
pub use dataset::{
    difficulty_weight, CategoryKind, Dataset, IndexField, Ingredient, Recipe, RecipeId,
    RecipeIndex, Step,
};
pub use error::{RecipeError, Result};
pub use extractor::NameExtractor;
pub use fuzzy::FuzzyMatcher;
pub use lookup::{DatasetLookup, RecipeLookup, RemoteLookup, SourceTag};
pub use manager::{
    RecipeCore, RecipeManager, RecipeSummary, Resolved, ResolverStats, SessionContext,
    SuggestionCriteria,
};
pub use rate_limit::{Admission, RateLimitConfig, RateLimiter};
pub use remote::{
    CompletionProvider, CompletionRequest, KnowledgeClient, OpenAiCompatibleProvider, RetryPolicy,
};
pub use resolver::ParallelResolver;
