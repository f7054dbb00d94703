//! Recipe name prompt.

use super::locale::Locale;
use crate::ai::{ChatMessage, ChatRequest};

/// Prompt name for logs and fakes.
pub const NAME_PROMPT_NAME: &str = "recipe_name";

pub fn name_request(recipe: &str, locale: Locale) -> ChatRequest {
    let t = locale.templates();
    ChatRequest::new(vec![
        ChatMessage::system(t.name_system),
        ChatMessage::user(format!("{}{}", t.name_task, recipe)),
    ])
}
