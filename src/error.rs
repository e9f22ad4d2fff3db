//! Error types for recipe resolution
//!
//! Only construction-time failures (dataset, configuration) ever reach callers of
//! the public resolve/suggest surface. Remote failures are turned into absent
//! results where they occur; the variants below still carry them between the
//! provider, the retry loop and the client so they can be logged with context.

use thiserror::Error;

/// Main error type for the recipe resolver
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The static dataset could not be loaded or failed validation
    #[error("Dataset error: {0}")]
    DatasetError(String),

    /// Remote knowledge service not configured or not reachable
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// Admission denied by the rate limiter
    #[error("Rate limit exceeded: {limit} calls per {window_secs}s")]
    RateLimited { limit: usize, window_secs: u64 },

    /// The remote service answered with something that is not a recipe
    #[error("Malformed remote response: {0}")]
    MalformedResponse(String),

    /// Operation timeout
    #[error("Operation timed out after {timeout_ms}ms: {context}")]
    TimeoutError { timeout_ms: u64, context: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP transport error (wrapper)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for recipe resolver operations
pub type Result<T> = std::result::Result<T, RecipeError>;

impl From<String> for RecipeError {
    fn from(s: String) -> Self {
        RecipeError::Other(s)
    }
}

impl From<&str> for RecipeError {
    fn from(s: &str) -> Self {
        RecipeError::Other(s.to_string())
    }
}
