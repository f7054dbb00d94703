pub mod add;
pub mod delete;
pub mod list;
pub mod transform;
pub mod update;

use crate::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use utoipa::OpenApi;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/get-recipes", get(list::list_recipes))
        .route("/api/v1/add-recipe", post(add::add_recipe))
        .route(
            "/api/v1/update-recipe",
            post(transform::transform_recipe).patch(update::update_recipe),
        )
        .route("/api/v1/delete-recipe", delete(delete::delete_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        add::add_recipe,
        update::update_recipe,
        transform::transform_recipe,
        delete::delete_recipe,
    ),
    components(schemas(
        list::RecipeItem,
        add::AddRecipeRequest,
        update::UpdateRecipeRequest,
        update::UpdateRecipeResponse,
        transform::TransformRequest,
        delete::DeleteRecipeRequest,
    ))
)]
pub struct ApiDoc;
