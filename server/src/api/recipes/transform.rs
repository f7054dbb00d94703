use crate::api::generate::RecipeResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use recipe_core::ai::prompts::Locale;
use recipe_core::{GenerationRequest, Payload};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransformRequest {
    pub recipe: String,
    /// What to change. A blank prompt only reformats.
    #[serde(rename = "changePrompt", default)]
    pub change_prompt: Option<String>,
    #[serde(rename = "isGerman", default)]
    pub is_german: bool,
}

/// Rewrite an existing recipe according to a free-text instruction.
/// Nothing is saved; use the PATCH method to store the result.
#[utoipa::path(
    post,
    path = "/api/v1/update-recipe",
    tag = "recipes",
    request_body = TransformRequest,
    responses(
        (status = 200, description = "Rewritten recipe", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
pub async fn transform_recipe(
    State(state): State<AppState>,
    payload: Result<Json<TransformRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let Json(req) = payload?;

    if req.recipe.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing recipe".to_string()));
    }

    let request = GenerationRequest::new(
        Payload::Transform {
            recipe: req.recipe,
            change_prompt: req.change_prompt,
        },
        Locale::from_is_german(req.is_german),
    );
    let recipe = state.generator.generate(request).await?;
    Ok(Json(recipe.into()))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body_json, TestApp};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_transform_recipe() {
        let app = TestApp::new();
        let response = app
            .post_json(
                "/api/v1/update-recipe",
                json!({"recipe": "# Soup\n- cream", "changePrompt": "make it vegan", "isGerman": false}),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["recipename"], "Tomato Soup");

        let calls = app.ai.calls();
        // Not judged.
        assert_eq!(calls[0].prompt_name, "transform");
        assert_eq!(
            calls[0].request.messages[1].content,
            "Change the following recipe according to this request: make it vegan\n\n# Soup\n- cream"
        );
    }

    #[tokio::test]
    async fn test_transform_requires_recipe() {
        let app = TestApp::new();
        let response = app
            .post_json(
                "/api/v1/update-recipe",
                json!({"recipe": "", "changePrompt": "vegan"}),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
