use super::RecipeResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use recipe_core::ai::prompts::Locale;
use recipe_core::{GenerationRequest, Payload};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DescriptionRequest {
    pub recipedescription: String,
    #[serde(rename = "isGerman", default)]
    pub is_german: bool,
    /// Free-form extra wishes appended to the description.
    #[serde(default)]
    pub details: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/generate/by-description",
    tag = "generate",
    request_body(content = DescriptionRequest, example = json!({"recipedescription": "tomato soup", "isGerman": false})),
    responses(
        (status = 200, description = "Recipe generated", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Input is not about a recipe", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_by_description(
    State(state): State<AppState>,
    payload: Result<Json<DescriptionRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let Json(req) = payload?;

    if req.recipedescription.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing recipedescription".to_string()));
    }

    let request = GenerationRequest::new(
        Payload::Description {
            text: req.recipedescription,
            details: req.details,
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
    use recipe_core::ai::FakeAiClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_generate_by_description() {
        let app = TestApp::new();
        let response = app
            .post_json(
                "/api/v1/generate/by-description",
                json!({"recipedescription": "tomato soup", "isGerman": false}),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["recipename"], "Tomato Soup");
        assert_eq!(body["category"], "Vorspeise");
        assert!(body["recipe"].as_str().unwrap().starts_with("# Tomato Soup"));
        assert!(body.get("transcript").is_none());
        assert!(body.get("id").is_none());

        let generation = app
            .ai
            .calls()
            .into_iter()
            .find(|c| c.prompt_name == "generate_description")
            .unwrap();
        assert_eq!(
            generation.request.messages[1].content,
            "Generate a recipe for the following description: tomato soup"
        );
    }

    #[tokio::test]
    async fn test_off_topic_input_is_rejected() {
        let ai = FakeAiClient::new();
        ai.add_response("judge", "no");
        ai.add_response("generate", "# Not a recipe");
        let app = TestApp::with_ai(ai);

        let response = app
            .post_json(
                "/api/v1/generate/by-description",
                json!({"recipedescription": "my car won't start", "isGerman": false}),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], "Input rejected by LLM judge");
        assert_eq!(app.ai.prompt_names(), vec!["judge"]);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let app = TestApp::new();
        let response = app
            .post_json(
                "/api/v1/generate/by-description",
                json!({"isGerman": true}),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid JSON payload");
        assert!(app.ai.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_description() {
        let app = TestApp::new();
        let response = app
            .post_json(
                "/api/v1/generate/by-description",
                json!({"recipedescription": "", "isGerman": true}),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.ai.calls().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_server_error() {
        let ai = FakeAiClient::new();
        ai.add_response("judge", "yes");
        ai.add_failure("generate", "quota exceeded");
        let app = TestApp::with_ai(ai);
        let response = app
            .post_json(
                "/api/v1/generate/by-description",
                json!({"recipedescription": "soup", "isGerman": false}),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Error generating recipe");
    }
}
