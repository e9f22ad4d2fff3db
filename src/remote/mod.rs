//! # Remote Knowledge Access
//!
//! Everything that talks to the remote completion service:
//!
//! - [`CompletionProvider`]: the service seam, with an OpenAI-compatible HTTP
//!   implementation in [`OpenAiCompatibleProvider`]
//! - [`RetryPolicy`]: bounded exponential backoff, one policy per call site
//! - [`KnowledgeClient`]: cache, rate limiter and retries around the provider
//!
//! The client turns every failure into an absent result, so callers only ever
//! see `Option`.

pub mod client;
pub mod document;
pub mod provider;
pub mod retry;

pub use client::KnowledgeClient;
pub use document::{parse_recipe_document, REMOTE_ID_PREFIX};
pub use provider::{CompletionProvider, CompletionRequest, OpenAiCompatibleProvider};
pub use retry::RetryPolicy;
