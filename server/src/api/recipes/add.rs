use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use recipe_core::publish::{publish_index, publish_recipe};
use recipe_core::{category_from, RecipeDraft};
use serde::Deserialize;
use utoipa::ToSchema;

pub const ADDED_MESSAGE: &str = "Recipe added successfully!";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddRecipeRequest {
    pub recipename: String,
    pub recipe: String,
    /// Accepted for symmetry with the generate routes; stored text is not translated.
    #[serde(rename = "isGerman", default)]
    pub is_german: bool,
    /// Derived from the recipe text when absent.
    #[serde(default)]
    pub recipecategory: Option<String>,
}

/// Save a recipe, mirror it into the caller's site and re-render the index.
#[utoipa::path(
    post,
    path = "/api/v1/add-recipe",
    tag = "recipes",
    request_body = AddRecipeRequest,
    responses(
        (status = 200, description = "Recipe added", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Saving or publishing failed", body = ErrorResponse)
    )
)]
pub async fn add_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<AddRecipeRequest>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    let Json(req) = payload?;

    if req.recipename.trim().is_empty() || req.recipe.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Recipe name and recipe are required".to_string(),
        ));
    }

    let category = match req.recipecategory.filter(|c| !c.trim().is_empty()) {
        Some(category) => category,
        None => category_from(state.ai.as_ref(), &req.recipe)
            .await
            .map_err(|e| ApiError::internal("Error categorizing recipe", e))?
            .to_string(),
    };

    let id = state
        .store
        .insert_recipe(
            user.id,
            RecipeDraft {
                name: req.recipename.clone(),
                content: req.recipe.clone(),
                category,
            },
        )
        .await?;
    tracing::info!(recipe_id = id, user_id = user.id, "Added recipe");

    publish_recipe(
        state.publisher.as_ref(),
        &user.storage_account,
        &req.recipename,
        &req.recipe,
    )
    .await
    .map_err(|e| ApiError::internal("Error uploading recipe", e))?;

    publish_index(state.publisher.as_ref(), state.store.as_ref(), &user)
        .await
        .map_err(|e| ApiError::internal("Failed to template recipes", e))?;

    Ok(ADDED_MESSAGE)
}
