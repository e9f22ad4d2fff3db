//! Recipe record types

use serde::{Deserialize, Serialize};

/// Stable recipe identifier (e.g. `butter_chicken`, `remote:pad_thai`)
pub type RecipeId = String;

/// A complete recipe record
///
/// Immutable once loaded; shared as `Arc<Recipe>` between the dataset, the
/// caches and callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub cuisine_type: String,
    /// Preparation time in minutes
    pub preparation_time: u32,
    pub difficulty_level: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub serving_size: u32,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
}

/// One ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

/// One preparation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub instruction: String,
    /// Minutes the step takes (0 when unknown)
    #[serde(default)]
    pub minutes: u32,
}

impl Recipe {
    /// Total minutes across all steps
    pub fn total_step_minutes(&self) -> u32 {
        self.steps.iter().map(|s| s.minutes).sum()
    }

    /// Ingredient names in list order
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|i| i.name.as_str())
    }
}

/// Score multiplier applied by difficulty when ranking suggestions
pub fn difficulty_weight(difficulty: &str) -> f64 {
    match difficulty.trim().to_lowercase().as_str() {
        "easy" => 1.1,
        "medium" => 1.0,
        "hard" => 0.9,
        _ => 1.0,
    }
}
