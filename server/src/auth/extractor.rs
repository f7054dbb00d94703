use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use recipe_core::User;

use super::principal::Principal;

/// Extractor that resolves the platform principal to a registered user.
///
/// Use this in any handler that requires authentication:
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     // user is the stored User
/// }
/// ```
pub struct AuthUser(pub User);

pub enum AuthError {
    MissingPrincipal,
    UnknownUser,
    Lookup,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingPrincipal => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized: Missing authentication headers",
            ),
            AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, "Unknown user, log in first"),
            AuthError::Lookup => (StatusCode::INTERNAL_SERVER_ERROR, "Error getting user"),
        };

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let oauth_id = Principal::id_from_headers(&parts.headers, state.config.local_dev)
            .ok_or(AuthError::MissingPrincipal)?;

        let user = state
            .store
            .find_user(&oauth_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to look up user");
                AuthError::Lookup
            })?
            .ok_or(AuthError::UnknownUser)?;

        Ok(AuthUser(user))
    }
}
