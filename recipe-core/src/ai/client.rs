//! AI client implementation against an OpenAI-compatible API.

use async_openai::{
    config::OpenAIConfig,
    types::{
        AudioInput, ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, CreateTranscriptionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use thiserror::Error;

use super::config::AiConfig;
use super::types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};

/// File name sent along with audio uploads. The API requires one; only the
/// extension is looked at, and it is not validated against the content.
pub const TRANSCRIPTION_FILENAME: &str = "voicemessage.mp3";

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Provider returned no completion choices")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Trait for AI clients.
///
/// Every call is a single attempt: no retries, no caching.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Complete a chat request.
    ///
    /// The `prompt_name` identifies the prompt family in logs and fakes.
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError>;

    /// Transcribe an audio recording to text.
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, AiError>;
}

/// AI client backed by `async-openai`.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    config: AiConfig,
}

impl OpenAiClient {
    /// Create a new client from environment configuration.
    pub fn from_env() -> Result<Self, AiError> {
        let config = AiConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Create a new client with the given configuration.
    pub fn new(config: AiConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            config,
        }
    }

    /// Convert our ChatMessage to async-openai's format.
    fn to_openai_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, AiError> {
        match msg.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map(Into::into)
                .map_err(|e| AiError::Api(format!("Failed to build system message: {}", e))),
            Role::User if msg.images.is_empty() => ChatCompletionRequestUserMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map(Into::into)
                .map_err(|e| AiError::Api(format!("Failed to build user message: {}", e))),
            Role::User => {
                let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> =
                    Vec::with_capacity(msg.images.len() + 1);

                let text = ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(msg.content.clone())
                    .build()
                    .map_err(|e| AiError::Api(format!("Failed to build text part: {}", e)))?;
                parts.push(text.into());

                for image in &msg.images {
                    let image_url = ImageUrlArgs::default()
                        .url(image.data_url())
                        .build()
                        .map_err(|e| AiError::Api(format!("Failed to build image url: {}", e)))?;
                    let part = ChatCompletionRequestMessageContentPartImageArgs::default()
                        .image_url(image_url)
                        .build()
                        .map_err(|e| AiError::Api(format!("Failed to build image part: {}", e)))?;
                    parts.push(part.into());
                }

                ChatCompletionRequestUserMessageArgs::default()
                    .content(parts)
                    .build()
                    .map(Into::into)
                    .map_err(|e| AiError::Api(format!("Failed to build user message: {}", e)))
            }
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map(Into::into)
                .map_err(|e| AiError::Api(format!("Failed to build assistant message: {}", e))),
        }
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let messages: Vec<ChatCompletionRequestMessage> = request
            .messages
            .iter()
            .map(Self::to_openai_message)
            .collect::<Result<Vec<_>, _>>()?;

        let model = request.model.as_deref().unwrap_or(&self.config.model);

        let mut req_builder = CreateChatCompletionRequestArgs::default();
        req_builder.model(model).messages(messages);

        if let Some(max_tokens) = request.max_tokens {
            req_builder.max_completion_tokens(max_tokens);
        }

        if let Some(temperature) = request.temperature {
            req_builder.temperature(temperature);
        }

        let openai_request = req_builder
            .build()
            .map_err(|e| AiError::Api(e.to_string()))?;

        tracing::debug!(prompt_name = prompt_name, model = model, "Calling AI API");

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| AiError::Api(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(AiError::EmptyResponse)?;

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(ChatResponse { content, usage })
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, AiError> {
        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(
                TRANSCRIPTION_FILENAME.to_string(),
                audio,
            ))
            .model(&self.config.transcription_model)
            .build()
            .map_err(|e| AiError::Api(e.to_string()))?;

        tracing::debug!(
            model = &self.config.transcription_model,
            "Calling transcription API"
        );

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| AiError::Api(e.to_string()))?;

        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ImageData;

    #[test]
    fn test_plain_user_message_converts() {
        let msg = OpenAiClient::to_openai_message(&ChatMessage::user("hello")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_image_message_converts_to_parts() {
        let msg = ChatMessage::user_with_images("contract", vec![ImageData::new("image/jpeg", "QUJD")]);
        let converted = OpenAiClient::to_openai_message(&msg).unwrap();
        let json = serde_json::to_value(&converted).unwrap();
        let parts = json["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,QUJD");
    }

    #[test]
    fn test_system_message_converts() {
        let msg = OpenAiClient::to_openai_message(&ChatMessage::system("rules")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::System(_)));
    }
}
