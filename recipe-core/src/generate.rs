//! Per-request generation pipeline.
//!
//! Steps run strictly in sequence, and the first failure ends the request:
//! validate, resolve the payload (fetch page or transcribe audio), judge
//! (description and audio only, when enabled), build the prompt, complete,
//! then name and categorize unless the caller supplied them.

use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

use crate::ai::prompts::{build_prompt, Locale, Modality, PromptInput};
use crate::ai::{AiClient, AiError, ImageData};
use crate::error::FetchError;
use crate::fetch::PageFetcher;
use crate::judge::is_recipe_related;
use crate::postprocess::{category_from, name_from};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input rejected by LLM judge")]
    Rejected,

    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] FetchError),

    #[error("AI call failed: {0}")]
    Ai(#[from] AiError),
}

/// What the caller sent, one variant per modality.
#[derive(Debug, Clone)]
pub enum Payload {
    Description {
        text: String,
        details: Option<String>,
    },
    Link {
        url: String,
    },
    Image(ImageData),
    Audio(Vec<u8>),
    Transform {
        recipe: String,
        change_prompt: Option<String>,
    },
}

impl Payload {
    pub fn modality(&self) -> Modality {
        match self {
            Payload::Description { .. } => Modality::Description,
            Payload::Link { .. } => Modality::Link,
            Payload::Image(_) => Modality::Image,
            Payload::Audio(_) => Modality::Audio,
            Payload::Transform { .. } => Modality::Transform,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Payload::Description { text, .. } => text.trim().is_empty(),
            Payload::Link { url } => url.trim().is_empty(),
            Payload::Image(image) => image.base64.is_empty(),
            Payload::Audio(bytes) => bytes.is_empty(),
            Payload::Transform { recipe, .. } => recipe.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub payload: Payload,
    pub locale: Locale,
    /// Used verbatim when present and non-blank.
    pub name: Option<String>,
    /// Used verbatim when present and non-blank.
    pub category: Option<String>,
}

impl GenerationRequest {
    pub fn new(payload: Payload, locale: Locale) -> Self {
        Self {
            payload,
            locale,
            name: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRecipe {
    pub name: String,
    pub body: String,
    pub category: String,
    /// Present only for audio requests.
    pub transcript: Option<String>,
    /// Assigned when the recipe is persisted.
    pub id: Option<i32>,
}

/// Payload after the external fetch/transcribe step.
enum Resolved {
    Description {
        text: String,
        details: Option<String>,
    },
    Link {
        page_text: String,
    },
    Image(ImageData),
    Audio {
        transcript: String,
    },
    Transform {
        recipe: String,
        change_prompt: Option<String>,
    },
}

impl Resolved {
    fn as_prompt_input(&self) -> PromptInput<'_> {
        match self {
            Resolved::Description { text, details } => PromptInput::Description {
                text,
                details: details.as_deref(),
            },
            Resolved::Link { page_text } => PromptInput::Link { page_text },
            Resolved::Image(image) => PromptInput::Image(image),
            Resolved::Audio { transcript } => PromptInput::Audio { transcript },
            Resolved::Transform {
                recipe,
                change_prompt,
            } => PromptInput::Transform {
                recipe,
                change_prompt: change_prompt.as_deref(),
            },
        }
    }

    /// Text the judge classifies, for the modalities that are gated.
    fn judged_text(&self) -> Option<&str> {
        match self {
            Resolved::Description { text, .. } => Some(text.as_str()),
            Resolved::Audio { transcript } => Some(transcript.as_str()),
            _ => None,
        }
    }
}

pub struct RecipeGenerator {
    ai: Arc<dyn AiClient>,
    fetcher: Arc<dyn PageFetcher>,
    judge_enabled: bool,
}

impl RecipeGenerator {
    pub fn new(ai: Arc<dyn AiClient>, fetcher: Arc<dyn PageFetcher>, judge_enabled: bool) -> Self {
        Self {
            ai,
            fetcher,
            judge_enabled,
        }
    }

    pub fn judge_enabled(&self) -> bool {
        self.judge_enabled
    }

    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedRecipe, GenerateError> {
        let modality = request.payload.modality();
        let span = tracing::info_span!("generate", modality = modality.as_str());
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: GenerationRequest) -> Result<GeneratedRecipe, GenerateError> {
        let GenerationRequest {
            payload,
            locale,
            name,
            category,
        } = request;
        let modality = payload.modality();

        if payload.is_empty() {
            return Err(GenerateError::InvalidInput(format!(
                "empty {} payload",
                modality.as_str()
            )));
        }

        let resolved = self.resolve(payload).await?;

        if self.judge_enabled {
            if let Some(text) = resolved.judged_text() {
                if !is_recipe_related(self.ai.as_ref(), text).await {
                    tracing::info!("Input rejected by judge");
                    return Err(GenerateError::Rejected);
                }
            }
        }

        let prompt = build_prompt(resolved.as_prompt_input(), locale);
        let response = self
            .ai
            .complete(modality.prompt_name(), prompt.into_request())
            .await?;
        let body = response.content;

        let name = match non_blank(name) {
            Some(name) => name,
            None => name_from(self.ai.as_ref(), &body, locale).await?,
        };
        let category = match non_blank(category) {
            Some(category) => category,
            None => category_from(self.ai.as_ref(), &body).await?.to_string(),
        };

        let transcript = match resolved {
            Resolved::Audio { transcript } => Some(transcript),
            _ => None,
        };

        tracing::info!(name = %name, category = %category, "Generated recipe");
        Ok(GeneratedRecipe {
            name,
            body,
            category,
            transcript,
            id: None,
        })
    }

    async fn resolve(&self, payload: Payload) -> Result<Resolved, GenerateError> {
        Ok(match payload {
            Payload::Description { text, details } => Resolved::Description { text, details },
            Payload::Link { url } => {
                let page_text = self.fetcher.fetch_page(url.trim()).await?;
                Resolved::Link { page_text }
            }
            Payload::Image(image) => Resolved::Image(image),
            Payload::Audio(bytes) => {
                let transcript = self.ai.transcribe(bytes).await?;
                tracing::debug!(transcript = %transcript, "Transcribed audio");
                if transcript.trim().is_empty() {
                    return Err(GenerateError::InvalidInput(
                        "recording contains no speech".to_string(),
                    ));
                }
                Resolved::Audio { transcript }
            }
            Payload::Transform {
                recipe,
                change_prompt,
            } => Resolved::Transform {
                recipe,
                change_prompt: non_blank(change_prompt),
            },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
