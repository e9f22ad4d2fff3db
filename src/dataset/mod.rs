//! # Recipe Dataset
//!
//! The immutable recipe collection and everything derived from it once at
//! startup: an O(1) name map, an alias map, category tables and the inverted
//! [`RecipeIndex`]. Nothing here changes after construction, so the dataset is
//! shared as a plain `Arc<Dataset>` without locking.
//!
//! A dataset that fails validation is a fatal startup error.

pub mod index;
pub mod types;

pub use index::{IndexField, RecipeIndex};
pub use types::{difficulty_weight, Ingredient, Recipe, RecipeId, Step};

use crate::error::{RecipeError, Result};
use crate::text::normalize;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

/// Built-in dataset shipped with the crate
const BUILTIN_DATASET: &str = include_str!("recipes.json");

/// Named recipe groupings outside the inverted index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    SpiceLevel,
    CookingMethod,
    Diet,
    Restriction,
    /// Regional groupings that cut across the recipes' own cuisine labels
    Region,
}

/// On-disk shape of the dataset document
#[derive(Debug, Deserialize)]
struct DatasetDocument {
    recipes: Vec<Recipe>,
    #[serde(default)]
    categories: CategoryDocument,
    #[serde(default)]
    aliases: BTreeMap<RecipeId, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct CategoryDocument {
    #[serde(default)]
    spice_levels: BTreeMap<String, Vec<RecipeId>>,
    #[serde(default)]
    cooking_methods: BTreeMap<String, Vec<RecipeId>>,
    #[serde(default)]
    dietary: BTreeMap<String, Vec<RecipeId>>,
    #[serde(default)]
    restrictions: BTreeMap<String, Vec<RecipeId>>,
    #[serde(default)]
    regions: BTreeMap<String, Vec<RecipeId>>,
}

/// Immutable recipe collection with lookup tables
#[derive(Debug)]
pub struct Dataset {
    recipes: Vec<Arc<Recipe>>,
    positions: HashMap<RecipeId, usize>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    /// Alias list of each recipe, by position
    alias_lists: Vec<Vec<String>>,
    categories: HashMap<CategoryKind, HashMap<String, HashSet<RecipeId>>>,
    index: RecipeIndex,
}

impl Dataset {
    /// Load the dataset embedded in the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DATASET)
    }

    /// Parse and validate a dataset document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: DatasetDocument = serde_json::from_str(json)
            .map_err(|e| RecipeError::DatasetError(format!("invalid dataset document: {}", e)))?;
        Self::from_document(document)
    }

    /// Build a dataset from bare recipes (no categories or aliases)
    pub fn from_recipes(recipes: Vec<Recipe>) -> Result<Self> {
        Self::from_document(DatasetDocument {
            recipes,
            categories: CategoryDocument::default(),
            aliases: BTreeMap::new(),
        })
    }

    fn from_document(document: DatasetDocument) -> Result<Self> {
        if document.recipes.is_empty() {
            return Err(RecipeError::DatasetError(
                "dataset contains no recipes".to_string(),
            ));
        }

        let mut positions = HashMap::with_capacity(document.recipes.len());
        let mut by_name = HashMap::with_capacity(document.recipes.len());

        for (position, recipe) in document.recipes.iter().enumerate() {
            if recipe.id.trim().is_empty() || recipe.name.trim().is_empty() {
                return Err(RecipeError::DatasetError(format!(
                    "recipe at position {} has an empty id or name",
                    position
                )));
            }
            if positions.insert(recipe.id.clone(), position).is_some() {
                return Err(RecipeError::DatasetError(format!(
                    "duplicate recipe id: {}",
                    recipe.id
                )));
            }
            // First recipe in dataset order owns a shared name
            by_name.entry(normalize(&recipe.name)).or_insert(position);
        }

        let index = RecipeIndex::build(&document.recipes);

        let known = |id: &RecipeId, context: &str| -> Result<()> {
            if positions.contains_key(id) {
                Ok(())
            } else {
                Err(RecipeError::DatasetError(format!(
                    "{} references unknown recipe id: {}",
                    context, id
                )))
            }
        };

        let mut categories = HashMap::new();
        for (kind, table) in [
            (CategoryKind::SpiceLevel, document.categories.spice_levels),
            (CategoryKind::CookingMethod, document.categories.cooking_methods),
            (CategoryKind::Diet, document.categories.dietary),
            (CategoryKind::Restriction, document.categories.restrictions),
            (CategoryKind::Region, document.categories.regions),
        ] {
            let mut groups: HashMap<String, HashSet<RecipeId>> = HashMap::new();
            for (key, ids) in table {
                for id in &ids {
                    known(id, &format!("category '{}'", key))?;
                }
                groups.entry(normalize(&key)).or_default().extend(ids);
            }
            categories.insert(kind, groups);
        }

        for id in document.aliases.keys() {
            known(id, "alias table")?;
        }
        let mut by_alias = HashMap::new();
        let mut alias_lists = Vec::with_capacity(document.recipes.len());
        for (position, recipe) in document.recipes.iter().enumerate() {
            let aliases = document.aliases.get(&recipe.id).cloned().unwrap_or_default();
            for alias in &aliases {
                by_alias.entry(normalize(alias)).or_insert(position);
            }
            alias_lists.push(aliases);
        }

        let recipes: Vec<Arc<Recipe>> = document.recipes.into_iter().map(Arc::new).collect();

        info!(
            "Loaded recipe dataset: {} recipes, {} ingredient tokens, {} aliases",
            recipes.len(),
            index.token_count(IndexField::Ingredient),
            by_alias.len()
        );

        Ok(Self {
            recipes,
            positions,
            by_name,
            by_alias,
            alias_lists,
            categories,
            index,
        })
    }

    /// Recipe by id
    pub fn get(&self, id: &str) -> Option<&Arc<Recipe>> {
        self.positions.get(id).map(|&position| &self.recipes[position])
    }

    /// Exact lookup by normalized recipe name
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<Recipe>> {
        self.by_name
            .get(&normalize(name))
            .map(|&position| &self.recipes[position])
    }

    /// Lookup by a known alternative name ("murgh makhani", "gol gappe", ...)
    pub fn find_by_alias(&self, name: &str) -> Option<&Arc<Recipe>> {
        self.by_alias
            .get(&normalize(name))
            .map(|&position| &self.recipes[position])
    }

    /// Known alternative names of a recipe; empty for unknown ids
    pub fn aliases_of(&self, id: &str) -> &[String] {
        self.positions
            .get(id)
            .map(|&position| self.alias_lists[position].as_slice())
            .unwrap_or(&[])
    }

    /// All recipes in dataset order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// The inverted ingredient/cuisine/difficulty index
    pub fn index(&self) -> &RecipeIndex {
        &self.index
    }

    /// Every recipe id
    pub fn all_ids(&self) -> HashSet<RecipeId> {
        self.positions.keys().cloned().collect()
    }

    /// Ids in a named category (case-insensitive key); empty when unknown
    pub fn category(&self, kind: CategoryKind, key: &str) -> HashSet<RecipeId> {
        self.categories
            .get(&kind)
            .and_then(|groups| groups.get(&normalize(key)))
            .cloned()
            .unwrap_or_default()
    }

    /// Every group of one kind as (normalized name, ids)
    pub fn category_groups(
        &self,
        kind: CategoryKind,
    ) -> impl Iterator<Item = (&str, &HashSet<RecipeId>)> {
        self.categories
            .get(&kind)
            .into_iter()
            .flat_map(|groups| groups.iter().map(|(name, ids)| (name.as_str(), ids)))
    }

    /// Category names of one kind
    pub fn category_names(&self, kind: CategoryKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .categories
            .get(&kind)
            .map(|groups| groups.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Ids of recipes that can be prepared within `max_minutes`
    pub fn ids_within_minutes(&self, max_minutes: u32) -> HashSet<RecipeId> {
        self.recipes
            .iter()
            .filter(|r| r.preparation_time <= max_minutes)
            .map(|r| r.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dataset_loads() {
        let dataset = Dataset::builtin().unwrap();
        assert_eq!(dataset.len(), 26);
        assert_eq!(dataset.iter().next().unwrap().id, "butter_chicken");
    }

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let dataset = Dataset::builtin().unwrap();
        let recipe = dataset.find_by_name("  dal MAKHANI ").unwrap();
        assert_eq!(recipe.id, "dal_makhani");
        assert!(dataset.find_by_name("dal makhni").is_none());
    }

    #[test]
    fn test_shared_name_resolves_to_first_recipe() {
        let dataset = Dataset::builtin().unwrap();
        // Two recipes are called "Bengali Fish Curry"
        assert_eq!(dataset.find_by_name("Bengali Fish Curry").unwrap().id, "fish_curry");
    }

    #[test]
    fn test_alias_lookup() {
        let dataset = Dataset::builtin().unwrap();
        assert_eq!(dataset.find_by_alias("Gol Gappe").unwrap().id, "pani_puri");
        assert_eq!(dataset.find_by_alias("murgh makhani").unwrap().id, "butter_chicken");
        assert!(dataset.aliases_of("pani_puri").iter().any(|a| a == "golgappa"));
        assert!(dataset.aliases_of("missing").is_empty());
    }

    #[test]
    fn test_every_recipe_is_indexed_under_its_tokens() {
        let dataset = Dataset::builtin().unwrap();
        let index = dataset.index();

        for recipe in dataset.iter() {
            for ingredient in &recipe.ingredients {
                assert!(index
                    .lookup(IndexField::Ingredient, &ingredient.name)
                    .unwrap()
                    .contains(&recipe.id));
            }
            assert!(index
                .lookup(IndexField::Cuisine, &recipe.cuisine_type)
                .unwrap()
                .contains(&recipe.id));
            assert!(index
                .lookup(IndexField::Difficulty, &recipe.difficulty_level)
                .unwrap()
                .contains(&recipe.id));
        }

        for field in [IndexField::Ingredient, IndexField::Cuisine, IndexField::Difficulty] {
            for (_, ids) in index.tokens(field) {
                assert!(ids.iter().all(|id| dataset.get(id).is_some()));
            }
        }
    }

    #[test]
    fn test_categories() {
        let dataset = Dataset::builtin().unwrap();
        let spicy = dataset.category(CategoryKind::SpiceLevel, "spicy");
        assert!(spicy.contains("chicken_65"));
        assert!(dataset.category(CategoryKind::CookingMethod, "Boiled").is_empty());
        assert!(dataset
            .category_names(CategoryKind::Diet)
            .contains(&"vegetarian"));
    }

    #[test]
    fn test_regions_and_restrictions() {
        let dataset = Dataset::builtin().unwrap();
        // tagged "Punjabi" but grouped with North Indian dishes
        let north = dataset.category(CategoryKind::Region, "North Indian");
        assert!(north.contains("sarson_ka_saag"));
        assert_eq!(north.len(), 5);

        let nuts = dataset.category(CategoryKind::Restriction, "contains nuts");
        assert_eq!(nuts.len(), 2);
        assert!(nuts.contains("kung_pao_chicken"));

        let regions: Vec<&str> = dataset
            .category_groups(CategoryKind::Region)
            .map(|(name, _)| name)
            .collect();
        assert_eq!(regions.len(), 12);
        assert!(regions.contains(&"street food"));
    }

    #[test]
    fn test_ids_within_minutes() {
        let dataset = Dataset::builtin().unwrap();
        let quick = dataset.ids_within_minutes(30);
        assert!(quick.contains("masala_dosa"));
        assert!(!quick.contains("coq_au_vin"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"{"recipes": [
            {"id": "a", "name": "A", "cuisine_type": "X", "preparation_time": 1,
             "difficulty_level": "Easy", "ingredients": [], "steps": []},
            {"id": "a", "name": "B", "cuisine_type": "X", "preparation_time": 1,
             "difficulty_level": "Easy", "ingredients": [], "steps": []}
        ]}"#;
        let err = Dataset::from_json(json).unwrap_err();
        assert!(matches!(err, RecipeError::DatasetError(_)));
    }

    #[test]
    fn test_rejects_dangling_category_reference() {
        let json = r#"{"recipes": [
            {"id": "a", "name": "A", "cuisine_type": "X", "preparation_time": 1,
             "difficulty_level": "Easy", "ingredients": [], "steps": []}
        ], "categories": {"spice_levels": {"Hot": ["missing"]}}}"#;
        assert!(Dataset::from_json(json).is_err());
    }

    #[test]
    fn test_rejects_empty_and_malformed_documents() {
        assert!(Dataset::from_json(r#"{"recipes": []}"#).is_err());
        assert!(Dataset::from_json("not json").is_err());
    }
}
