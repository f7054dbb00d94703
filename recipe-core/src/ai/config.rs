//! AI configuration from environment variables.

use std::env;
use thiserror::Error;

/// Default OpenAI-compatible base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default speech-to-text model.
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Which completion backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    /// Deterministic canned answers, for local development without an API key.
    Fake,
}

/// AI client configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: AiProvider,
    /// API key; empty for the fake provider.
    pub api_key: String,
    /// Chat model name (e.g., "gpt-4o-mini").
    pub model: String,
    /// Speech-to-text model name.
    pub transcription_model: String,
    /// Base URL for the API.
    pub base_url: String,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `OPENAI_KEY`: API key (not needed when `AI_PROVIDER=fake`)
    ///
    /// Optional:
    /// - `AI_PROVIDER`: "openai" (default) or "fake"
    /// - `OPENAI_MODEL`: chat model (default: "gpt-4o-mini")
    /// - `OPENAI_TRANSCRIPTION_MODEL`: speech-to-text model (default: "whisper-1")
    /// - `OPENAI_BASE_URL`: API base URL (default: "https://api.openai.com/v1")
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match env::var("AI_PROVIDER").as_deref() {
            Err(_) | Ok("openai") => AiProvider::OpenAi,
            Ok("fake") => AiProvider::Fake,
            Ok(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "AI_PROVIDER".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let api_key = match provider {
            AiProvider::OpenAi => env::var("OPENAI_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("OPENAI_KEY".to_string()))?,
            AiProvider::Fake => env::var("OPENAI_KEY").unwrap_or_default(),
        };

        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let transcription_model = env::var("OPENAI_TRANSCRIPTION_MODEL")
            .unwrap_or_else(|_| DEFAULT_TRANSCRIPTION_MODEL.to_string());

        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            provider,
            api_key,
            model,
            transcription_model,
            base_url,
        })
    }
}
