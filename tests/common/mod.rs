//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use recipe_resolver::{
    CompletionProvider, CompletionRequest, Dataset, Recipe, RecipeCore, RecipeError,
    RecipeLookup, ResolverConfig, RetryPolicy, SourceTag,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Completion provider answering from fixed tables
///
/// Name-extraction requests are answered from `names` (keyed by the exact
/// prompt), recipe requests from `documents` (keyed by a phrase the prompt must
/// contain). Anything else is an error.
#[derive(Default)]
pub struct ScriptedProvider {
    names: Mutex<HashMap<String, String>>,
    documents: Mutex<Vec<(String, String)>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn with_name(self, prompt: &str, reply: &str) -> Self {
        self.names
            .lock()
            .unwrap()
            .insert(prompt.to_string(), reply.to_string());
        self
    }

    pub fn with_document(self, phrase: &str, json: &str) -> Self {
        self.documents
            .lock()
            .unwrap()
            .push((phrase.to_string(), json.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> recipe_resolver::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if request.expects_document() {
            let documents = self.documents.lock().unwrap();
            documents
                .iter()
                .find(|(phrase, _)| request.prompt.contains(phrase.as_str()))
                .map(|(_, json)| json.clone())
                .ok_or_else(|| RecipeError::RemoteUnavailable("no scripted document".into()))
        } else {
            self.names
                .lock()
                .unwrap()
                .get(&request.prompt)
                .cloned()
                .ok_or_else(|| RecipeError::RemoteUnavailable("no scripted name".into()))
        }
    }
}

/// Provider whose every call fails
#[derive(Default)]
pub struct FailingProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &CompletionRequest) -> recipe_resolver::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RecipeError::RemoteUnavailable("connection refused".into()))
    }
}

/// Lookup that waits before answering
pub struct SlowLookup {
    pub source: SourceTag,
    pub delay: Duration,
    pub recipe: Option<Arc<Recipe>>,
    pub finished: Arc<AtomicUsize>,
}

impl SlowLookup {
    pub fn new(source: SourceTag, delay_ms: u64, recipe: Option<Arc<Recipe>>) -> Self {
        Self {
            source,
            delay: Duration::from_millis(delay_ms),
            recipe,
            finished: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl RecipeLookup for SlowLookup {
    fn source(&self) -> SourceTag {
        self.source
    }

    async fn lookup(&self, _name: &str) -> Option<Arc<Recipe>> {
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        self.recipe.clone()
    }
}

/// A recipe from the built-in dataset
pub fn builtin_recipe(id: &str) -> Arc<Recipe> {
    let dataset = Dataset::builtin().unwrap();
    Arc::clone(dataset.get(id).unwrap())
}

/// Config with retries that do not sleep
pub fn fast_config() -> ResolverConfig {
    ResolverConfig {
        extraction_retry: RetryPolicy::immediate(2),
        recipe_retry: RetryPolicy::immediate(2),
        ..ResolverConfig::default()
    }
}

/// Core over the built-in dataset backed by `provider`
pub fn core_with(provider: Arc<dyn CompletionProvider>) -> Arc<RecipeCore> {
    Arc::new(RecipeCore::builtin(fast_config(), Some(provider)).unwrap())
}

pub const PAD_THAI: &str = r#"```json
{
  "name": "Pad Thai",
  "cuisine_type": "Thai",
  "preparation_time": "30 minutes",
  "difficulty_level": "Medium",
  "ingredients": [
    {"name": "rice noodles", "quantity": 200, "unit": "g"},
    {"name": "tamarind paste", "quantity": "2 tbsp"},
    "bean sprouts"
  ],
  "steps": [
    {"step": "Soak the noodles", "time": 10},
    {"step": "Stir fry everything", "time": 8}
  ]
}
```"#;

pub const QUANTUM_LASAGNA: &str = r#"{
  "name": "Quantum Lasagna",
  "cuisine_type": "Italian",
  "preparation_time": 75,
  "difficulty_level": "Hard",
  "ingredients": ["lasagna sheets", "ricotta", "tomato sauce"],
  "steps": ["Layer", "Bake"]
}"#;
