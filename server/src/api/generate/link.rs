use super::RecipeResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use recipe_core::ai::prompts::Locale;
use recipe_core::{GenerationRequest, Payload};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LinkRequest {
    pub url: String,
    #[serde(rename = "isGerman", default)]
    pub is_german: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/generate/by-link",
    tag = "generate",
    request_body(content = LinkRequest, example = json!({"url": "https://example.com/banana-bread", "isGerman": true})),
    responses(
        (status = 200, description = "Recipe generated from the page", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Fetch or generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_by_link(
    State(state): State<AppState>,
    payload: Result<Json<LinkRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let Json(req) = payload?;

    if req.url.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing link".to_string()));
    }

    let request = GenerationRequest::new(
        Payload::Link { url: req.url },
        Locale::from_is_german(req.is_german),
    );
    let recipe = state.generator.generate(request).await?;
    Ok(Json(recipe.into()))
}
