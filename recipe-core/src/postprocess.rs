//! Name and category derivation from generated recipe text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ai::prompts::category::{category_request, CATEGORY_PROMPT_NAME};
use crate::ai::prompts::name::{name_request, NAME_PROMPT_NAME};
use crate::ai::prompts::Locale;
use crate::ai::{AiClient, AiError};

/// Recipe category. The labels are stored and published verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Hauptgericht")]
    MainCourse,
    #[serde(rename = "Vorspeise")]
    Starter,
    #[serde(rename = "Brot")]
    Bread,
    #[serde(rename = "Dessert")]
    Dessert,
    #[serde(rename = "Sonstiges")]
    Misc,
}

impl Category {
    /// The labels the model may answer with, in matching priority order.
    pub const KNOWN: [Category; 4] = [
        Category::MainCourse,
        Category::Starter,
        Category::Bread,
        Category::Dessert,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::MainCourse => "Hauptgericht",
            Category::Starter => "Vorspeise",
            Category::Bread => "Brot",
            Category::Dessert => "Dessert",
            Category::Misc => "Sonstiges",
        }
    }

    /// Exact label lookup, for stored values. Anything unknown is `Misc`.
    pub fn from_label(label: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|c| c.label() == label)
            .unwrap_or(Category::Misc)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scan a model answer for the first known label it contains.
pub fn match_category(answer: &str) -> Category {
    Category::KNOWN
        .into_iter()
        .find(|c| answer.contains(c.label()))
        .unwrap_or(Category::Misc)
}

/// Ask the model for a category and map its answer onto the closed set.
pub async fn category_from(ai: &dyn AiClient, recipe: &str) -> Result<Category, AiError> {
    let response = ai
        .complete(CATEGORY_PROMPT_NAME, category_request(recipe))
        .await?;
    let category = match_category(&response.content);
    tracing::debug!(answer = %response.content, category = %category, "Derived category");
    Ok(category)
}

/// Ask the model for a short name. The answer is returned unmodified.
pub async fn name_from(ai: &dyn AiClient, recipe: &str, locale: Locale) -> Result<String, AiError> {
    let response = ai
        .complete(NAME_PROMPT_NAME, name_request(recipe, locale))
        .await?;
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeAiClient;

    #[test]
    fn test_match_category_substring() {
        assert_eq!(
            match_category("This is a Hauptgericht-style dish"),
            Category::MainCourse
        );
        assert_eq!(match_category("I'd say Dessert works well"), Category::Dessert);
        assert_eq!(match_category("Brot"), Category::Bread);
    }

    #[test]
    fn test_match_category_priority_order() {
        assert_eq!(match_category("Dessert or Vorspeise"), Category::Starter);
        assert_eq!(match_category("Brot, Hauptgericht"), Category::MainCourse);
    }

    #[test]
    fn test_match_category_default() {
        assert_eq!(match_category("Soup"), Category::Misc);
        assert_eq!(match_category("dessert"), Category::Misc);
        assert_eq!(match_category(""), Category::Misc);
    }

    #[test]
    fn test_labels_roundtrip() {
        for c in Category::KNOWN {
            assert_eq!(Category::from_label(c.label()), c);
        }
        assert_eq!(Category::from_label("Suppe"), Category::Misc);
        assert_eq!(
            serde_json::to_string(&Category::MainCourse).unwrap(),
            "\"Hauptgericht\""
        );
    }

    #[tokio::test]
    async fn test_name_is_not_truncated() {
        let ai = FakeAiClient::with_response("recipe_name", "Very Long Five Word Name");
        let name = name_from(&ai, "# Soup", Locale::English).await.unwrap();
        assert_eq!(name, "Very Long Five Word Name");
    }

    #[tokio::test]
    async fn test_category_from_model_answer() {
        let ai = FakeAiClient::with_response("category", "Vorspeise");
        let category = category_from(&ai, "# Soup").await.unwrap();
        assert_eq!(category, Category::Starter);
    }

    #[tokio::test]
    async fn test_category_error_propagates() {
        let ai = FakeAiClient::new();
        ai.add_failure("category", "timeout");
        assert!(category_from(&ai, "# Soup").await.is_err());
    }
}
