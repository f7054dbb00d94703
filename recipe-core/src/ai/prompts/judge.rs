//! Judge prompt: is the input about a recipe at all?

use crate::ai::{ChatMessage, ChatRequest};

/// Prompt name for logs and fakes.
pub const JUDGE_PROMPT_NAME: &str = "judge";

pub const JUDGE_SYSTEM_PROMPT: &str =
    "You are a judge AI agent that decides whether input is related to a recipe or not.";

pub fn render_judge_user_prompt(input: &str) -> String {
    format!("Is this input related to a recipe? Only answer with 'yes' or 'no': {input}")
}

pub fn judge_request(input: &str) -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system(JUDGE_SYSTEM_PROMPT),
        ChatMessage::user(render_judge_user_prompt(input)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt() {
        let prompt = render_judge_user_prompt("tomato soup");
        assert!(prompt.starts_with("Is this input related to a recipe?"));
        assert!(prompt.ends_with("tomato soup"));
    }
}
