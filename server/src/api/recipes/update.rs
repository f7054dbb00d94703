use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use recipe_core::publish::{publish_index, publish_recipe};
use recipe_core::{category_from, RecipeDraft};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub recipename: String,
    #[serde(default)]
    pub recipe: String,
    /// Derived from the recipe text when absent.
    #[serde(default)]
    pub recipecategory: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateRecipeResponse {
    pub message: String,
}

#[utoipa::path(
    patch,
    path = "/api/v1/update-recipe",
    tag = "recipes",
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = UpdateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found or not owned by the caller", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<UpdateRecipeRequest>, JsonRejection>,
) -> Result<Json<UpdateRecipeResponse>, ApiError> {
    let Json(req) = payload?;

    if req.id == 0 || req.recipename.trim().is_empty() || req.recipe.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Recipe id, name and recipe are required".to_string(),
        ));
    }

    let category = match req.recipecategory.filter(|c| !c.trim().is_empty()) {
        Some(category) => category,
        None => category_from(state.ai.as_ref(), &req.recipe)
            .await
            .map_err(|e| ApiError::internal("Error categorizing recipe", e))?
            .to_string(),
    };

    let updated = state
        .store
        .update_recipe(
            req.id,
            user.id,
            RecipeDraft {
                name: req.recipename.clone(),
                content: req.recipe.clone(),
                category,
            },
        )
        .await?;
    if !updated {
        return Err(ApiError::NotFound(
            "Recipe not found or unauthorized".to_string(),
        ));
    }
    tracing::info!(recipe_id = req.id, user_id = user.id, "Updated recipe");

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

    Ok(Json(UpdateRecipeResponse {
        message: "Recipe updated successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body_json, json_request, TestApp};
    use axum::http::StatusCode;
    use recipe_core::publish::INDEX_PATH;
    use recipe_core::{RecipeDraft, RecipeStore};
    use serde_json::json;

    async fn seed(app: &TestApp, oauth_id: &str) -> (recipe_core::User, i32) {
        let user = app.login(oauth_id).await;
        let id = app
            .store
            .insert_recipe(
                user.id,
                RecipeDraft {
                    name: "Soup".to_string(),
                    content: "# Soup".to_string(),
                    category: "Vorspeise".to_string(),
                },
            )
            .await
            .unwrap();
        (user, id)
    }

    #[tokio::test]
    async fn test_update_recipe() {
        let app = TestApp::new();
        let (user, id) = seed(&app, "oid-up").await;

        let response = app
            .send(json_request(
                "PATCH",
                "/api/v1/update-recipe",
                json!({"id": id, "recipename": "Bread Roll", "recipe": "# Bread Roll", "recipecategory": "Brot"}),
                Some("oid-up"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Recipe updated successfully"})
        );

        let stored = app.store.list_recipes(user.id).await.unwrap();
        assert_eq!(stored[0].name, "Bread Roll");
        assert_eq!(stored[0].category, "Brot");
        assert!(app
            .publisher
            .get(&user.storage_account, "recipes/Bread-Roll.md")
            .is_some());
        let index = app.publisher.get(&user.storage_account, INDEX_PATH).unwrap();
        assert!(index.contains("- [Bread Roll](/?recipe=Bread-Roll)"));
    }

    #[tokio::test]
    async fn test_update_other_users_recipe_is_not_found() {
        let app = TestApp::new();
        let (owner, id) = seed(&app, "owner").await;
        app.login("intruder").await;

        let response = app
            .send(json_request(
                "PATCH",
                "/api/v1/update-recipe",
                json!({"id": id, "recipename": "Mine", "recipe": "# Mine", "recipecategory": "Brot"}),
                Some("intruder"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "Recipe not found or unauthorized"
        );
        assert_eq!(app.store.list_recipes(owner.id).await.unwrap()[0].name, "Soup");
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let app = TestApp::new();
        app.login("oid-noid").await;
        let response = app
            .send(json_request(
                "PATCH",
                "/api/v1/update-recipe",
                json!({"recipename": "Soup", "recipe": "# Soup"}),
                Some("oid-noid"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
