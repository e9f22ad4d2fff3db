//! Per-session conversational state

use crate::dataset::Recipe;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// What one conversation has asked for so far
///
/// Owned by a single [`RecipeManager`](super::RecipeManager) and only changed
/// through its operations.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Candidate name of the most recent resolve
    pub last_search: Option<String>,
    /// Most recently resolved recipe
    #[serde(skip)]
    pub current_recipe: Option<Arc<Recipe>>,
    pub available_ingredients: Vec<String>,
    pub cuisine_preference: Option<String>,
    pub dietary_restrictions: Vec<String>,
    /// Names from the last similar-match or suggestion list
    pub search_results: Vec<String>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            last_search: None,
            current_recipe: None,
            available_ingredients: Vec::new(),
            cuisine_preference: None,
            dietary_restrictions: Vec::new(),
            search_results: Vec::new(),
        }
    }

    /// Add ingredients, skipping blanks and case-insensitive duplicates
    pub fn remember_ingredients<I, S>(&mut self, ingredients: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ingredient in ingredients {
            let ingredient = ingredient.as_ref().trim();
            if ingredient.is_empty() {
                continue;
            }
            let known = self
                .available_ingredients
                .iter()
                .any(|i| i.eq_ignore_ascii_case(ingredient));
            if !known {
                self.available_ingredients.push(ingredient.to_string());
            }
        }
    }

    /// Add a restriction group, skipping blanks and case-insensitive duplicates
    pub fn add_dietary_restriction(&mut self, restriction: impl Into<String>) {
        let restriction = restriction.into();
        let restriction = restriction.trim();
        if restriction.is_empty() {
            return;
        }
        let known = self
            .dietary_restrictions
            .iter()
            .any(|r| r.eq_ignore_ascii_case(restriction));
        if !known {
            self.dietary_restrictions.push(restriction.to_string());
        }
    }

    /// Forget everything except the session identity
    pub fn reset(&mut self) {
        *self = Self {
            session_id: self.session_id,
            started_at: self.started_at,
            ..Self::new()
        };
    }
}
