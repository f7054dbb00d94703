//! Category prompt listing the closed label set.

use crate::ai::{ChatMessage, ChatRequest};
use crate::postprocess::Category;

/// Prompt name for logs and fakes.
pub const CATEGORY_PROMPT_NAME: &str = "category";

pub fn render_category_system_prompt() -> String {
    let labels: Vec<&str> = Category::KNOWN.iter().map(|c| c.label()).collect();
    format!(
        "What is the category of this recipe? Currently only {} are supported. \
         Answer with a single word nothing else",
        labels.join(", ")
    )
}

pub fn category_request(recipe: &str) -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system(render_category_system_prompt()),
        ChatMessage::user(recipe),
    ])
}
