//! Fake AI client for tests and offline development.
//!
//! Responses are matched against the prompt name of each call, so tests can
//! script the judge, the generator and the post-processor independently and
//! then inspect which calls were made.

use async_trait::async_trait;
use std::sync::{Mutex, RwLock};

use super::client::{AiClient, AiError};
use super::types::{ChatRequest, ChatResponse, Usage};

/// A call observed by the fake client.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt_name: String,
    pub request: ChatRequest,
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

/// A fake AI client.
///
/// A response registered under `pattern` answers every call whose prompt name
/// contains `pattern` (case-insensitive). Patterns are tried in registration
/// order. Unmatched calls fail.
#[derive(Debug, Default)]
pub struct FakeAiClient {
    responses: RwLock<Vec<(String, Scripted)>>,
    transcript: RwLock<Option<Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
    transcriptions: Mutex<usize>,
}

impl FakeAiClient {
    /// Create a new FakeAiClient with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a FakeAiClient that answers prompts matching `pattern` with `response`.
    pub fn with_response(pattern: &str, response: &str) -> Self {
        let client = Self::new();
        client.add_response(pattern, response);
        client
    }

    /// Canned answers for every prompt family, used when the server runs
    /// with `AI_PROVIDER=fake`.
    pub fn with_recipe_responses() -> Self {
        let client = Self::new();
        client.add_response("judge", "yes");
        client.add_response("recipe_name", "Tomato Soup");
        client.add_response("category", "Vorspeise");
        client.add_response(
            "generate",
            "# Tomato Soup\n## Ingredients\n- **800 g** tomatoes\n- **1** onion\n\
             ## Preparation\n### Prepare\n- Chop the onion\n### Cook\n- Simmer for 20 minutes\n",
        );
        client.add_response(
            "transform",
            "# Tomato Soup\n## Ingredients\n- **800 g** tomatoes\n## Preparation\n### Cook\n- Simmer\n",
        );
        client.set_transcript("A simple tomato soup with onions");
        client
    }

    /// Answer prompts matching `pattern` with `response`.
    pub fn add_response(&self, pattern: &str, response: &str) {
        self.script(pattern, Scripted::Reply(response.to_string()));
    }

    /// Fail prompts matching `pattern` with an API error.
    pub fn add_failure(&self, pattern: &str, message: &str) {
        self.script(pattern, Scripted::Fail(message.to_string()));
    }

    /// Set the text returned by `transcribe`.
    pub fn set_transcript(&self, transcript: &str) {
        *self.transcript.write().unwrap() = Some(Ok(transcript.to_string()));
    }

    /// Make `transcribe` fail.
    pub fn fail_transcription(&self, message: &str) {
        *self.transcript.write().unwrap() = Some(Err(message.to_string()));
    }

    /// All completion calls made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Prompt names of all completion calls made so far, in order.
    pub fn prompt_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.prompt_name)
            .collect()
    }

    /// Number of transcription calls made so far.
    pub fn transcription_count(&self) -> usize {
        *self.transcriptions.lock().unwrap()
    }

    fn script(&self, pattern: &str, scripted: Scripted) {
        self.responses
            .write()
            .unwrap()
            .push((pattern.to_lowercase(), scripted));
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt_name: prompt_name.to_string(),
            request,
        });

        let name_lower = prompt_name.to_lowercase();
        let scripted = self
            .responses
            .read()
            .unwrap()
            .iter()
            .find(|(pattern, _)| name_lower.contains(pattern.as_str()))
            .map(|(_, scripted)| scripted.clone());

        match scripted {
            Some(Scripted::Reply(content)) => Ok(ChatResponse {
                content,
                usage: Usage::default(),
            }),
            Some(Scripted::Fail(message)) => Err(AiError::Api(message)),
            None => Err(AiError::Api(format!(
                "FakeAiClient: no response configured for prompt {}",
                prompt_name
            ))),
        }
    }

    async fn transcribe(&self, _audio: Vec<u8>) -> Result<String, AiError> {
        *self.transcriptions.lock().unwrap() += 1;
        match self.transcript.read().unwrap().clone() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AiError::Api(message)),
            None => Err(AiError::Api(
                "FakeAiClient: no transcript configured".to_string(),
            )),
        }
    }
}
