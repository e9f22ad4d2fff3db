//! Multi-criteria recipe suggestions
//!
//! Every supplied filter narrows the candidate set to one id set, and the sets
//! are intersected. An ingredient term that matches nothing therefore empties
//! the whole result; there is no partial-match fallback.

use crate::dataset::{difficulty_weight, CategoryKind, Dataset, IndexField, Recipe, RecipeId};
use crate::fuzzy::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Most suggestions returned by one call
pub const MAX_SUGGESTIONS: usize = 5;

const BASE_SCORE: f64 = 50.0;
const INGREDIENT_WEIGHT: f64 = 30.0;
const CUISINE_BONUS: f64 = 20.0;

/// Filters for [`RecipeManager::suggest`](super::RecipeManager::suggest)
///
/// Blank strings and empty ingredient lists count as "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionCriteria {
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub cuisine: Option<String>,
    pub difficulty: Option<String>,
    pub spice_level: Option<String>,
    pub cooking_method: Option<String>,
    pub diet: Option<String>,
    /// Dietary restriction groups ("Gluten Free", "Egg Free", ...); every one
    /// supplied must hold
    #[serde(default)]
    pub restrictions: Vec<String>,
    pub max_minutes: Option<u32>,
}

impl SuggestionCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn with_spice_level(mut self, spice_level: impl Into<String>) -> Self {
        self.spice_level = Some(spice_level.into());
        self
    }

    pub fn with_cooking_method(mut self, method: impl Into<String>) -> Self {
        self.cooking_method = Some(method.into());
        self
    }

    pub fn with_diet(mut self, diet: impl Into<String>) -> Self {
        self.diet = Some(diet.into());
        self
    }

    pub fn with_restriction(mut self, restriction: impl Into<String>) -> Self {
        self.restrictions.push(restriction.into());
        self
    }

    pub fn with_max_minutes(mut self, minutes: u32) -> Self {
        self.max_minutes = Some(minutes);
        self
    }

    /// Non-blank ingredient terms
    fn ingredient_terms(&self) -> Vec<&str> {
        self.ingredients
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect()
    }

    fn restriction_terms(&self) -> Vec<&str> {
        self.restrictions
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect()
    }

    fn supplied(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// True when no filter is supplied
    pub fn is_empty(&self) -> bool {
        self.ingredient_terms().is_empty()
            && Self::supplied(&self.cuisine).is_none()
            && Self::supplied(&self.difficulty).is_none()
            && Self::supplied(&self.spice_level).is_none()
            && Self::supplied(&self.cooking_method).is_none()
            && Self::supplied(&self.diet).is_none()
            && self.restriction_terms().is_empty()
            && self.max_minutes.is_none()
    }
}

/// One ranked suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub name: String,
    pub score: f64,
    pub cuisine: String,
    pub description: String,
    pub difficulty: String,
    /// Preparation time in minutes
    pub time: u32,
}

pub(crate) struct Suggester<'a> {
    pub dataset: &'a Dataset,
    pub matcher: &'a FuzzyMatcher,
    pub threshold: f64,
}

impl Suggester<'_> {
    /// Top suggestions, best first; equal scores keep dataset order
    pub fn suggest(&self, criteria: &SuggestionCriteria) -> Vec<RecipeSummary> {
        let candidates = self.candidates(criteria);
        let terms = criteria.ingredient_terms();
        let cuisine = SuggestionCriteria::supplied(&criteria.cuisine);

        let mut scored: Vec<RecipeSummary> = self
            .dataset
            .iter()
            .filter(|recipe| candidates.contains(&recipe.id))
            .map(|recipe| RecipeSummary {
                name: recipe.name.clone(),
                score: self.score(recipe, &terms, cuisine),
                cuisine: recipe.cuisine_type.clone(),
                description: recipe.description.clone(),
                difficulty: recipe.difficulty_level.clone(),
                time: recipe.preparation_time,
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(MAX_SUGGESTIONS);
        scored
    }

    /// Intersection of one id set per supplied filter
    fn candidates(&self, criteria: &SuggestionCriteria) -> HashSet<RecipeId> {
        let mut filters: Vec<HashSet<RecipeId>> = Vec::new();

        for term in criteria.ingredient_terms() {
            filters.push(self.fuzzy_index_matches(IndexField::Ingredient, term));
        }
        if let Some(cuisine) = SuggestionCriteria::supplied(&criteria.cuisine) {
            let mut ids = self.fuzzy_index_matches(IndexField::Cuisine, cuisine);
            ids.extend(self.fuzzy_region_matches(cuisine));
            filters.push(ids);
        }
        if let Some(difficulty) = SuggestionCriteria::supplied(&criteria.difficulty) {
            filters.push(
                self.dataset
                    .index()
                    .lookup(IndexField::Difficulty, difficulty)
                    .cloned()
                    .unwrap_or_default(),
            );
        }
        for (kind, value) in [
            (CategoryKind::SpiceLevel, &criteria.spice_level),
            (CategoryKind::CookingMethod, &criteria.cooking_method),
            (CategoryKind::Diet, &criteria.diet),
        ] {
            if let Some(key) = SuggestionCriteria::supplied(value) {
                filters.push(self.dataset.category(kind, key));
            }
        }
        for restriction in criteria.restriction_terms() {
            filters.push(self.dataset.category(CategoryKind::Restriction, restriction));
        }
        if let Some(minutes) = criteria.max_minutes {
            filters.push(self.dataset.ids_within_minutes(minutes));
        }

        let mut filters = filters.into_iter();
        match filters.next() {
            None => self.dataset.all_ids(),
            Some(first) => filters.fold(first, |acc, set| &acc & &set),
        }
    }

    /// Union of the id sets of every index token scoring above the threshold
    fn fuzzy_index_matches(&self, field: IndexField, term: &str) -> HashSet<RecipeId> {
        self.dataset
            .index()
            .tokens(field)
            .filter(|(token, _)| self.matcher.score(term, token) > self.threshold)
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    /// Members of every regional grouping whose name scores above the threshold
    fn fuzzy_region_matches(&self, cuisine: &str) -> HashSet<RecipeId> {
        self.dataset
            .category_groups(CategoryKind::Region)
            .filter(|(region, _)| self.matcher.score(cuisine, region) > self.threshold)
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    fn score(&self, recipe: &Recipe, terms: &[&str], cuisine: Option<&str>) -> f64 {
        let mut score = BASE_SCORE;

        if !terms.is_empty() {
            let total: f64 = terms
                .iter()
                .map(|term| {
                    recipe
                        .ingredient_names()
                        .map(|name| self.matcher.score(term, name))
                        .fold(0.0, f64::max)
                })
                .sum();
            score += total / terms.len() as f64 * INGREDIENT_WEIGHT;
        }

        if let Some(cuisine) = cuisine {
            if self.matcher.score(cuisine, &recipe.cuisine_type) > self.threshold {
                score += CUISINE_BONUS;
            }
        }

        score * difficulty_weight(&recipe.difficulty_level)
    }
}
