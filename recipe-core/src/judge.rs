//! Relevance pre-filter run before the primary generation call.

use crate::ai::prompts::judge::{judge_request, JUDGE_PROMPT_NAME};
use crate::ai::AiClient;

/// Ask the model whether `text` is about a recipe.
///
/// Returns true iff the answer contains "yes" in any case. A failed call
/// counts as a rejection.
pub async fn is_recipe_related(ai: &dyn AiClient, text: &str) -> bool {
    match ai.complete(JUDGE_PROMPT_NAME, judge_request(text)).await {
        Ok(response) => {
            let verdict = verdict_from(&response.content);
            tracing::debug!(verdict, answer = %response.content, "Judge verdict");
            verdict
        }
        Err(e) => {
            tracing::warn!(error = %e, "Judge call failed, rejecting input");
            false
        }
    }
}

fn verdict_from(answer: &str) -> bool {
    answer.to_lowercase().contains("yes")
}
