pub mod login;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for endpoints that establish identity
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/login", get(login::login).post(login::login))
}

#[derive(OpenApi)]
#[openapi(paths(login::login))]
pub struct ApiDoc;
