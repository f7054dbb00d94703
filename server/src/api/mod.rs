pub mod generate;
pub mod health;
pub mod public;
pub mod recipes;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use recipe_core::ai::AiError;
use recipe_core::publish::{PublishError, SiteError};
use recipe_core::{GenerateError, StoreError};
use serde::Serialize;
use thiserror::Error;
use utoipa::{OpenApi, ToSchema};

use crate::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors returned by handlers. Server-side details are logged, never sent.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Input rejected by LLM judge")]
    Rejected,

    #[error("{0}")]
    NotFound(String),

    /// Public message and logged detail.
    #[error("{0}")]
    Internal(&'static str, String),
}

impl ApiError {
    pub fn internal(message: &'static str, detail: impl std::fmt::Display) -> Self {
        ApiError::Internal(message, detail.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(message, detail) => {
                tracing::error!(error = %detail, "{}", message);
            }
            other => {
                tracing::warn!(status = status.as_u16(), error = %other, "Request rejected");
            }
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::InvalidInput(message) => ApiError::BadRequest(message),
            GenerateError::Rejected => ApiError::Rejected,
            GenerateError::Fetch(e) => ApiError::internal("Error fetching recipe page", e),
            GenerateError::Ai(e) => ApiError::internal("Error generating recipe", e),
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::internal("Error generating recipe", err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::internal("Database error", err)
    }
}

impl From<PublishError> for ApiError {
    fn from(err: PublishError) -> Self {
        ApiError::internal("Failed to publish recipe site", err)
    }
}

impl From<SiteError> for ApiError {
    fn from(err: SiteError) -> Self {
        match err {
            SiteError::Store(e) => e.into(),
            SiteError::Publish(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!(error = %err.body_text(), "Invalid JSON payload");
        ApiError::BadRequest("Invalid JSON payload".to_string())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        ApiError::BadRequest(format!("Invalid multipart form: {}", err.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Upload too large".to_string())
        } else {
            ApiError::BadRequest(format!("Invalid multipart form: {}", err.body_text()))
        }
    }
}

/// All API routes, without documentation or tracing layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(public::router())
        .merge(generate::router())
        .merge(recipes::router())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "recipe-server", description = "Recipe generation and publishing API"),
        components(schemas(ErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        health::ApiDoc::openapi(),
        public::ApiDoc::openapi(),
        generate::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ApiError::from(GenerateError::InvalidInput("empty".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GenerateError::Ai(AiError::EmptyResponse)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_hides_detail() {
        let err = ApiError::internal("Database error", "connection refused on 10.0.0.5");
        assert_eq!(err.to_string(), "Database error");
    }

    #[test]
    fn test_openapi_lists_routes() {
        let spec = openapi();
        for path in [
            "/health",
            "/api/v1/login",
            "/api/v1/generate/by-description",
            "/api/v1/generate/by-image",
            "/api/v1/update-recipe",
            "/api/v1/delete-recipe",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
