//! Completion service seam and its OpenAI-compatible HTTP implementation

use crate::config::RemoteConfig;
use crate::error::{RecipeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a recipe name extractor. Extract only the recipe \
     name from the user's input. Respond with ONLY the recipe name, nothing else.";

const RECIPE_SYSTEM_PROMPT: &str =
    "You are a cooking expert. Provide recipe details in JSON format.";

/// One completion call: a system instruction plus a user prompt
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Short free-text completion that should answer with a bare recipe name
    pub fn name_extraction(text: &str) -> Self {
        Self {
            system: EXTRACTION_SYSTEM_PROMPT.to_string(),
            prompt: text.to_string(),
            temperature: 0.3,
            max_tokens: 50,
        }
    }

    /// Structured completion that should answer with a recipe JSON document
    pub fn recipe_document(name: &str) -> Self {
        Self {
            system: RECIPE_SYSTEM_PROMPT.to_string(),
            prompt: format!(
                "Provide a detailed recipe for {} in JSON format with name, ingredients \
                 (with quantities), steps, cuisine_type, preparation_time, and difficulty_level.",
                name
            ),
            temperature: 0.7,
            max_tokens: 500,
        }
    }

    /// True for requests built by [`CompletionRequest::recipe_document`]
    pub fn expects_document(&self) -> bool {
        self.system == RECIPE_SYSTEM_PROMPT
    }
}

/// A remote text-completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Return the raw completion text for `request`
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Provider speaking the `/chat/completions` protocol
pub struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from remote settings; fails without an API key
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RecipeError::ConfigError("remote API key is not set".to_string()))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()?;

        info!(
            "Initializing completion provider: base_url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request to {} failed: {}", self.base_url, e);
                RecipeError::RemoteUnavailable(format!("request failed: {}", e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            RecipeError::RemoteUnavailable(format!("reading response failed: {}", e))
        })?;
        if !status.is_success() {
            return Err(RecipeError::RemoteUnavailable(format!(
                "completion service returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            RecipeError::MalformedResponse(format!("completion body is not a chat response: {}", e))
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                RecipeError::RemoteUnavailable("completion returned no choices".to_string())
            })?;

        debug!("Received completion: {} chars", content.len());
        Ok(content)
    }
}
