//! Recipe lookups by name, and the tags that say where a result came from

use crate::dataset::{Dataset, Recipe};
use crate::fuzzy::FuzzyMatcher;
use crate::remote::KnowledgeClient;
use crate::text::tokens;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Where a resolved recipe came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    /// The recipe cache
    Cache,
    /// The built-in dataset
    Local,
    /// The remote completion service
    Remote,
    /// The closest dataset recipe to a name that matched nothing
    Similar,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Cache => "cache",
            SourceTag::Local => "local",
            SourceTag::Remote => "remote",
            SourceTag::Similar => "similar",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source of recipes by name
///
/// The parallel resolver races two of these against each other.
#[async_trait]
pub trait RecipeLookup: Send + Sync {
    /// Tag reported when this lookup wins
    fn source(&self) -> SourceTag;

    async fn lookup(&self, name: &str) -> Option<Arc<Recipe>>;
}

/// Name lookups against the built-in dataset
pub struct DatasetLookup {
    dataset: Arc<Dataset>,
    matcher: Arc<FuzzyMatcher>,
    threshold: f64,
}

impl DatasetLookup {
    pub fn new(dataset: Arc<Dataset>, matcher: Arc<FuzzyMatcher>, threshold: f64) -> Self {
        Self {
            dataset,
            matcher,
            threshold,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Exact name, then alias, then the best fuzzy match
    ///
    /// The fuzzy pass scores a recipe's name and its aliases, but only those
    /// that share at least one word with `name`. The best score must exceed
    /// the threshold; ties go to the earlier recipe.
    pub fn find(&self, name: &str) -> Option<Arc<Recipe>> {
        if let Some(recipe) = self.dataset.find_by_name(name) {
            return Some(Arc::clone(recipe));
        }
        if let Some(recipe) = self.dataset.find_by_alias(name) {
            debug!("Alias match: '{}' -> {}", name, recipe.id);
            return Some(Arc::clone(recipe));
        }

        let query_tokens: HashSet<String> = tokens(name).into_iter().collect();
        if query_tokens.is_empty() {
            return None;
        }

        let mut best: Option<(&Arc<Recipe>, f64)> = None;
        for recipe in self.dataset.iter() {
            let score = self
                .names_of(recipe)
                .filter(|candidate| tokens(candidate).iter().any(|t| query_tokens.contains(t)))
                .map(|candidate| self.matcher.score(name, candidate))
                .fold(0.0, f64::max);
            if score > self.threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((recipe, score));
            }
        }

        best.map(|(recipe, score)| {
            debug!("Fuzzy match: '{}' -> {} ({:.3})", name, recipe.id, score);
            Arc::clone(recipe)
        })
    }

    /// Every recipe whose name or an alias scores above the threshold, best
    /// first
    ///
    /// A recipe scores its best over name and aliases. Equal scores keep
    /// dataset order.
    pub fn rank_similar(&self, name: &str) -> Vec<(Arc<Recipe>, f64)> {
        let mut ranked: Vec<(Arc<Recipe>, f64)> = self
            .dataset
            .iter()
            .map(|recipe| {
                let score = self
                    .names_of(recipe)
                    .map(|candidate| self.matcher.score(name, candidate))
                    .fold(0.0, f64::max);
                (Arc::clone(recipe), score)
            })
            .filter(|(_, score)| *score > self.threshold)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    fn names_of<'a>(&'a self, recipe: &'a Recipe) -> impl Iterator<Item = &'a str> {
        std::iter::once(recipe.name.as_str())
            .chain(self.dataset.aliases_of(&recipe.id).iter().map(String::as_str))
    }
}

#[async_trait]
impl RecipeLookup for DatasetLookup {
    fn source(&self) -> SourceTag {
        SourceTag::Local
    }

    async fn lookup(&self, name: &str) -> Option<Arc<Recipe>> {
        self.find(name)
    }
}

/// Name lookups against the remote service
pub struct RemoteLookup {
    client: Arc<KnowledgeClient>,
}

impl RemoteLookup {
    pub fn new(client: Arc<KnowledgeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecipeLookup for RemoteLookup {
    fn source(&self) -> SourceTag {
        SourceTag::Remote
    }

    async fn lookup(&self, name: &str) -> Option<Arc<Recipe>> {
        self.client.fetch_recipe(name).await
    }
}
