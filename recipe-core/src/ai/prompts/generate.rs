//! Prompt construction for the primary generation call, one shape per input modality.

use serde::{Deserialize, Serialize};

use super::locale::Locale;
use crate::ai::{ChatMessage, ChatRequest, ImageData};

/// Input medium of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Description,
    Link,
    Image,
    Audio,
    Transform,
}

impl Modality {
    /// Prompt name used for logging and fake matching.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Modality::Description => "generate_description",
            Modality::Link => "generate_link",
            Modality::Image => "generate_image",
            Modality::Audio => "generate_audio",
            Modality::Transform => "transform",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Description => "description",
            Modality::Link => "link",
            Modality::Image => "image",
            Modality::Audio => "audio",
            Modality::Transform => "transform",
        }
    }
}

/// Resolved payload ready to be templated. Link pages are already fetched
/// and audio is already transcribed at this point.
#[derive(Debug, Clone, Copy)]
pub enum PromptInput<'a> {
    Description {
        text: &'a str,
        details: Option<&'a str>,
    },
    Link {
        page_text: &'a str,
    },
    Image(&'a ImageData),
    Audio {
        transcript: &'a str,
    },
    Transform {
        recipe: &'a str,
        change_prompt: Option<&'a str>,
    },
}

impl PromptInput<'_> {
    pub fn modality(&self) -> Modality {
        match self {
            PromptInput::Description { .. } => Modality::Description,
            PromptInput::Link { .. } => Modality::Link,
            PromptInput::Image(_) => Modality::Image,
            PromptInput::Audio { .. } => Modality::Audio,
            PromptInput::Transform { .. } => Modality::Transform,
        }
    }
}

/// The system and user instruction for one generation call.
///
/// Image prompts have no system message: the format contract travels as the
/// text part of the user message, next to the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub system: Option<String>,
    pub user: String,
    pub images: Vec<ImageData>,
}

impl PromptSpec {
    pub fn into_request(self) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system {
            messages.push(ChatMessage::system(system));
        }
        if self.images.is_empty() {
            messages.push(ChatMessage::user(self.user));
        } else {
            messages.push(ChatMessage::user_with_images(self.user, self.images));
        }
        ChatRequest::new(messages)
    }
}

/// Build the prompt for a generation call. Pure and deterministic.
pub fn build_prompt(input: PromptInput<'_>, locale: Locale) -> PromptSpec {
    let t = locale.templates();

    match input {
        PromptInput::Description { text, details } => PromptSpec {
            system: Some(t.format_contract.to_string()),
            user: describe(t.describe_task, text, details, t.details_label),
            images: Vec::new(),
        },
        PromptInput::Audio { transcript } => PromptSpec {
            system: Some(t.format_contract.to_string()),
            user: describe(t.describe_task, transcript, None, t.details_label),
            images: Vec::new(),
        },
        PromptInput::Link { page_text } => PromptSpec {
            system: Some(t.format_contract.to_string()),
            user: format!("{}{}", t.link_task, page_text),
            images: Vec::new(),
        },
        PromptInput::Image(image) => PromptSpec {
            system: None,
            user: t.format_contract.to_string(),
            images: vec![image.clone()],
        },
        PromptInput::Transform {
            recipe,
            change_prompt,
        } => {
            let user = match change_prompt {
                Some(change) => format!("{}{}\n\n{}", t.change_task, change, recipe),
                None => format!("{}{}", t.reformat_task, recipe),
            };
            PromptSpec {
                system: Some(t.transform_contract.to_string()),
                user,
                images: Vec::new(),
            }
        }
    }
}

fn describe(task: &str, text: &str, details: Option<&str>, details_label: &str) -> String {
    match details.filter(|d| !d.trim().is_empty()) {
        Some(details) => format!("{task}{text}\n{details_label}{details}"),
        None => format!("{task}{text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Role;

    #[test]
    fn test_description_english() {
        let spec = build_prompt(
            PromptInput::Description {
                text: "tomato soup",
                details: None,
            },
            Locale::English,
        );
        assert_eq!(
            spec.system.as_deref(),
            Some(Locale::English.templates().format_contract)
        );
        assert_eq!(
            spec.user,
            "Generate a recipe for the following description: tomato soup"
        );
        assert!(spec.images.is_empty());
    }

    #[test]
    fn test_description_with_details() {
        let spec = build_prompt(
            PromptInput::Description {
                text: "Pizza",
                details: Some("no cheese"),
            },
            Locale::German,
        );
        assert_eq!(
            spec.user,
            "Erstelle ein Rezept für folgende Beschreibung: Pizza\nZusätzliche Details: no cheese"
        );
    }

    #[test]
    fn test_blank_details_are_ignored() {
        let with_blank = build_prompt(
            PromptInput::Description {
                text: "Pizza",
                details: Some("  "),
            },
            Locale::English,
        );
        let without = build_prompt(
            PromptInput::Description {
                text: "Pizza",
                details: None,
            },
            Locale::English,
        );
        assert_eq!(with_blank, without);
    }

    #[test]
    fn test_audio_matches_description() {
        let audio = build_prompt(
            PromptInput::Audio {
                transcript: "two eggs and flour",
            },
            Locale::German,
        );
        let description = build_prompt(
            PromptInput::Description {
                text: "two eggs and flour",
                details: None,
            },
            Locale::German,
        );
        assert_eq!(audio, description);
    }

    #[test]
    fn test_link_wraps_page_text() {
        let spec = build_prompt(
            PromptInput::Link {
                page_text: "<html>Pancakes</html>",
            },
            Locale::English,
        );
        assert_eq!(spec.user, "Change to markdown format: <html>Pancakes</html>");
    }

    #[test]
    fn test_image_has_single_user_message_with_contract() {
        let image = ImageData::new("image/jpeg", "QUJD");
        let spec = build_prompt(PromptInput::Image(&image), Locale::English);
        assert!(spec.system.is_none());
        assert_eq!(spec.user, Locale::English.templates().format_contract);

        let request = spec.into_request();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.messages[0].images, vec![image]);
    }

    #[test]
    fn test_transform_uses_narrow_contract() {
        let spec = build_prompt(
            PromptInput::Transform {
                recipe: "# Soup",
                change_prompt: Some("make it vegan"),
            },
            Locale::English,
        );
        assert_eq!(
            spec.system.as_deref(),
            Some(Locale::English.templates().transform_contract)
        );
        assert_eq!(
            spec.user,
            "Change the following recipe according to this request: make it vegan\n\n# Soup"
        );

        let plain = build_prompt(
            PromptInput::Transform {
                recipe: "# Soup",
                change_prompt: None,
            },
            Locale::English,
        );
        assert_eq!(plain.user, "Reformat the following recipe: # Soup");
    }

    #[test]
    fn test_text_prompt_has_system_then_user() {
        let request = build_prompt(
            PromptInput::Description {
                text: "bread",
                details: None,
            },
            Locale::English,
        )
        .into_request();
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
    }
}
