use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use recipe_core::publish::publish_index;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteRecipeRequest {
    #[serde(rename = "recipeID", default)]
    pub recipe_id: i32,
}

/// Delete a recipe and re-render the index. The recipe's own Markdown file
/// stays in the site but is no longer linked.
#[utoipa::path(
    delete,
    path = "/api/v1/delete-recipe",
    tag = "recipes",
    request_body = DeleteRecipeRequest,
    responses(
        (status = 200, description = "Recipe deleted"),
        (status = 400, description = "Missing recipe id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found or not owned by the caller", body = ErrorResponse)
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<DeleteRecipeRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;

    if req.recipe_id == 0 {
        return Err(ApiError::BadRequest("Missing recipe ID".to_string()));
    }

    if !state.store.delete_recipe(req.recipe_id, user.id).await? {
        return Err(ApiError::NotFound(
            "Recipe not found or unauthorized".to_string(),
        ));
    }
    tracing::info!(recipe_id = req.recipe_id, user_id = user.id, "Deleted recipe");

    publish_index(state.publisher.as_ref(), state.store.as_ref(), &user)
        .await
        .map_err(|e| ApiError::internal("Failed to template recipes", e))?;

    Ok(StatusCode::OK)
}
