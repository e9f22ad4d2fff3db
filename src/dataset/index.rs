//! Inverted indices over ingredient, cuisine and difficulty tokens

use super::types::{Recipe, RecipeId};
use crate::text::normalize;
use std::collections::{HashMap, HashSet};

/// Which attribute an index token was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexField {
    Ingredient,
    Cuisine,
    Difficulty,
}

/// Lowercase token -> ids of recipes carrying that token
///
/// Built once from the dataset and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecipeIndex {
    ingredients: HashMap<String, HashSet<RecipeId>>,
    cuisines: HashMap<String, HashSet<RecipeId>>,
    difficulties: HashMap<String, HashSet<RecipeId>>,
}

impl RecipeIndex {
    /// Build the index from a recipe collection
    pub fn build<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) -> Self {
        let mut index = Self::default();

        for recipe in recipes {
            for ingredient in &recipe.ingredients {
                index
                    .ingredients
                    .entry(normalize(&ingredient.name))
                    .or_default()
                    .insert(recipe.id.clone());
            }
            index
                .cuisines
                .entry(normalize(&recipe.cuisine_type))
                .or_default()
                .insert(recipe.id.clone());
            index
                .difficulties
                .entry(normalize(&recipe.difficulty_level))
                .or_default()
                .insert(recipe.id.clone());
        }

        index
    }

    fn field(&self, field: IndexField) -> &HashMap<String, HashSet<RecipeId>> {
        match field {
            IndexField::Ingredient => &self.ingredients,
            IndexField::Cuisine => &self.cuisines,
            IndexField::Difficulty => &self.difficulties,
        }
    }

    /// Ids indexed under `token` (normalized before lookup)
    pub fn lookup(&self, field: IndexField, token: &str) -> Option<&HashSet<RecipeId>> {
        self.field(field).get(&normalize(token))
    }

    /// All tokens of one field with their id sets
    pub fn tokens(&self, field: IndexField) -> impl Iterator<Item = (&str, &HashSet<RecipeId>)> {
        self.field(field).iter().map(|(token, ids)| (token.as_str(), ids))
    }

    /// Number of distinct tokens in one field
    pub fn token_count(&self, field: IndexField) -> usize {
        self.field(field).len()
    }
}
