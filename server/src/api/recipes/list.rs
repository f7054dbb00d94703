use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{extract::State, Json};
use recipe_core::StoredRecipe;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeItem {
    pub id: i32,
    pub recipename: String,
    pub recipe: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
}

impl From<StoredRecipe> for RecipeItem {
    fn from(recipe: StoredRecipe) -> Self {
        Self {
            id: recipe.id,
            recipename: recipe.name,
            recipe: recipe.content,
            category: recipe.category,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/get-recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "The caller's recipes, oldest first", body = Vec<RecipeItem>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeItem>>, ApiError> {
    let recipes = state.store.list_recipes(user.id).await?;
    Ok(Json(recipes.into_iter().map(RecipeItem::from).collect()))
}
