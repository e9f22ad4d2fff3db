//! Lenient parsing of recipe documents returned by the completion service
//!
//! Completions are free-form, so the shapes accepted here are wider than the
//! dataset's: ingredients and steps may be objects or bare strings, times may be
//! numbers or text such as `"45 minutes"`, and the whole document may sit inside
//! a Markdown code fence.

use crate::dataset::{Ingredient, Recipe, Step};
use crate::error::{RecipeError, Result};
use crate::text::slug;
use serde::Deserialize;

/// Id prefix for recipes that came from the remote service
pub const REMOTE_ID_PREFIX: &str = "remote:";

#[derive(Debug, Deserialize)]
struct RemoteDocument {
    name: Option<String>,
    #[serde(default)]
    cuisine_type: Option<String>,
    #[serde(default)]
    preparation_time: Option<Minutes>,
    #[serde(default)]
    difficulty_level: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    serving_size: Option<Minutes>,
    #[serde(default)]
    ingredients: Vec<RemoteIngredient>,
    #[serde(default)]
    steps: Vec<RemoteStep>,
}

/// A count that may arrive as a number or as text with a leading number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Minutes {
    Number(f64),
    Text(String),
}

impl Minutes {
    fn value(&self) -> u32 {
        match self {
            Minutes::Number(n) if n.is_finite() && *n > 0.0 => n.round() as u32,
            Minutes::Number(_) => 0,
            Minutes::Text(text) => text
                .trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
                .parse()
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteIngredient {
    Line(String),
    Detailed {
        name: String,
        #[serde(default)]
        quantity: Option<Quantity>,
        #[serde(default)]
        unit: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteStep {
    Line(String),
    Detailed {
        #[serde(alias = "step")]
        instruction: String,
        #[serde(default, alias = "time")]
        minutes: Option<Minutes>,
    },
}

impl From<RemoteIngredient> for Ingredient {
    fn from(ingredient: RemoteIngredient) -> Self {
        match ingredient {
            RemoteIngredient::Line(name) => Ingredient {
                name: name.trim().to_string(),
                quantity: 0.0,
                unit: String::new(),
            },
            RemoteIngredient::Detailed {
                name,
                quantity,
                unit,
            } => {
                // "2 cups" style quantities keep their number; the rest becomes the unit
                let (quantity, unit) = match (quantity, unit) {
                    (Some(Quantity::Number(n)), unit) => (n, unit.unwrap_or_default()),
                    (Some(Quantity::Text(text)), unit) => split_quantity(&text, unit),
                    (None, unit) => (0.0, unit.unwrap_or_default()),
                };
                Ingredient {
                    name: name.trim().to_string(),
                    quantity,
                    unit,
                }
            }
        }
    }
}

fn split_quantity(text: &str, unit: Option<String>) -> (f64, String) {
    let text = text.trim();
    let number_end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let quantity = text[..number_end].parse().unwrap_or(0.0);
    let rest = text[number_end..].trim();
    let unit = unit
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| rest.to_string());
    (quantity, unit)
}

impl From<RemoteStep> for Step {
    fn from(step: RemoteStep) -> Self {
        match step {
            RemoteStep::Line(instruction) => Step {
                instruction: instruction.trim().to_string(),
                minutes: 0,
            },
            RemoteStep::Detailed {
                instruction,
                minutes,
            } => Step {
                instruction: instruction.trim().to_string(),
                minutes: minutes.map(|m| m.value()).unwrap_or(0),
            },
        }
    }
}

/// Remove a surrounding ```json ... ``` fence if present
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // skip the info string ("json") on the opening line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a completion into a [`Recipe`]
///
/// A document without a name, or with neither ingredients nor steps, is a
/// [`RecipeError::MalformedResponse`]. Missing cuisine and difficulty default to
/// `"Unknown"` and `"Medium"`.
pub fn parse_recipe_document(raw: &str) -> Result<Recipe> {
    let document: RemoteDocument = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| RecipeError::MalformedResponse(format!("not a recipe document: {}", e)))?;

    let name = document
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| RecipeError::MalformedResponse("recipe document has no name".to_string()))?;

    if document.ingredients.is_empty() && document.steps.is_empty() {
        return Err(RecipeError::MalformedResponse(format!(
            "recipe document for '{}' has neither ingredients nor steps",
            name
        )));
    }

    let steps: Vec<Step> = document.steps.into_iter().map(Step::from).collect();
    let preparation_time = document
        .preparation_time
        .map(|m| m.value())
        .filter(|&m| m > 0)
        .unwrap_or_else(|| steps.iter().map(|s| s.minutes).sum());

    Ok(Recipe {
        id: format!("{}{}", REMOTE_ID_PREFIX, slug(&name)),
        cuisine_type: document
            .cuisine_type
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        preparation_time,
        difficulty_level: document
            .difficulty_level
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "Medium".to_string()),
        description: document.description.unwrap_or_default(),
        serving_size: document.serving_size.map(|s| s.value()).unwrap_or(0),
        ingredients: document.ingredients.into_iter().map(Ingredient::from).collect(),
        steps,
        name,
    })
}
