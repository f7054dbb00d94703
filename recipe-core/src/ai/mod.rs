//! AI client module for LLM integration over an OpenAI-compatible API.
//!
//! This module provides:
//! - `AiClient` trait for abstracting AI providers
//! - `OpenAiClient` implementation on `async-openai` (chat and transcription)
//! - `FakeAiClient` with scripted answers for tests and offline development
//! - Configuration via environment variables
//! - Prompt templates for every generation mode
//!
//! # Configuration
//!
//! - `OPENAI_KEY` (required unless `AI_PROVIDER=fake`): API key
//! - `AI_PROVIDER` (optional): "openai" or "fake"
//! - `OPENAI_MODEL` (optional): chat model, e.g. "gpt-4o-mini"
//! - `OPENAI_TRANSCRIPTION_MODEL` (optional): speech-to-text model
//! - `OPENAI_BASE_URL` (optional): API base URL
//!
//! # Example
//!
//! ```ignore
//! use recipe_core::ai::{create_client_from_env, ChatMessage, ChatRequest};
//!
//! let client = create_client_from_env()?;
//! let request = ChatRequest::new(vec![ChatMessage::user("Hello!")]);
//! let response = client.complete("test", request).await?;
//! println!("Response: {}", response.content);
//! ```

mod client;
mod config;
mod fake;
pub mod prompts;
mod types;

use std::sync::Arc;

pub use client::{AiClient, AiError, OpenAiClient, TRANSCRIPTION_FILENAME};
pub use config::{AiConfig, AiProvider, ConfigError};
pub use fake::{FakeAiClient, RecordedCall};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ImageData, Role, Usage};

/// Build the client selected by `AI_PROVIDER`.
pub fn create_client_from_env() -> Result<Arc<dyn AiClient>, AiError> {
    let config = AiConfig::from_env()?;
    Ok(create_client(config))
}

pub fn create_client(config: AiConfig) -> Arc<dyn AiClient> {
    match config.provider {
        AiProvider::OpenAi => {
            tracing::info!(model = %config.model, base_url = %config.base_url, "Using OpenAI client");
            Arc::new(OpenAiClient::new(config))
        }
        AiProvider::Fake => {
            tracing::warn!("AI_PROVIDER=fake: responses are canned");
            Arc::new(FakeAiClient::with_recipe_responses())
        }
    }
}
