use crate::api::{ApiError, ErrorResponse};
use crate::auth::Principal;
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use recipe_core::publish::{bootstrap_site, publish_index};
use recipe_core::{random_account_name, NewUser, User};

/// Get or create the caller's account. A new account gets a random storage
/// account name, a provisioned and bootstrapped site, and an empty index.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "auth",
    responses(
        (status = 200, description = "Logged in; identity returned in X-USER-* headers"),
        (status = 401, description = "Missing authentication headers", body = ErrorResponse),
        (status = 500, description = "Account creation failed", body = ErrorResponse)
    )
)]
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let principal = Principal::from_headers(&headers, state.config.local_dev).ok_or_else(|| {
        ApiError::Unauthorized("Unauthorized: Missing authentication headers".to_string())
    })?;

    let user = match state.store.find_user(&principal.id).await? {
        Some(user) => user,
        None => register(&state, &principal).await?,
    };

    let mut response = StatusCode::OK.into_response();
    let out = response.headers_mut();
    for (name, value) in [
        ("x-user-name", &principal.name),
        ("x-user-id", &principal.id),
        ("x-user-provider", &principal.provider),
        ("x-user-storageaccount", &user.storage_account),
    ] {
        if let Ok(value) = HeaderValue::from_str(value) {
            out.insert(HeaderName::from_static(name), value);
        }
    }
    Ok(response)
}

async fn register(state: &AppState, principal: &Principal) -> Result<User, ApiError> {
    // No user row without a bootstrapped site.
    let storage_account = random_account_name();
    bootstrap_site(
        state.publisher.as_ref(),
        &storage_account,
        state.config.bootstrap_retry,
    )
    .await
    .map_err(|e| ApiError::internal("Failed to bootstrap static website", e))?;

    let user = state
        .store
        .create_user(NewUser {
            oauth_id: principal.id.clone(),
            name: principal.name.clone(),
            provider: principal.provider.clone(),
            storage_account,
        })
        .await?;
    tracing::info!(
        user_id = user.id,
        account = %user.storage_account,
        provider = %user.provider,
        "Registered new user"
    );

    publish_index(state.publisher.as_ref(), state.store.as_ref(), &user)
        .await
        .map_err(|e| ApiError::internal("Failed to template recipes", e))?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body_string, principal_headers, TestApp};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use recipe_core::publish::{INDEX_PATH, TEMPLATE_FILES};
    use recipe_core::RecipeStore;

    #[tokio::test]
    async fn test_login_creates_user_and_bootstraps_site() {
        let app = TestApp::new();
        let mut request = Request::builder().method("POST").uri("/api/v1/login");
        for (k, v) in principal_headers("oid-1") {
            request = request.header(k, v);
        }
        let response = app.send(request.body(Body::empty()).unwrap()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let account = response.headers()["x-user-storageaccount"]
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(account.len(), 8);
        assert_eq!(response.headers()["x-user-id"], "oid-1");

        let user = app.store.find_user("oid-1").await.unwrap().unwrap();
        assert_eq!(user.storage_account, account);
        for file in TEMPLATE_FILES {
            assert!(app.publisher.get(&account, file).is_some(), "missing {file}");
        }
        assert!(app
            .publisher
            .get(&account, INDEX_PATH)
            .unwrap()
            .starts_with("# Rezepte\n\n"));
    }

    #[tokio::test]
    async fn test_login_is_idempotent() {
        let app = TestApp::new();
        let first = app.login("oid-2").await;
        let second = app.login("oid-2").await;
        assert_eq!(first.storage_account, second.storage_account);
        assert_eq!(app.publisher.copy_attempts(), TEMPLATE_FILES.len());
    }

    #[tokio::test]
    async fn test_login_requires_headers() {
        let app = TestApp::new();
        let response = app
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/login")
                    .header("X-MS-CLIENT-PRINCIPAL-ID", "oid-3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("Missing authentication headers"));
    }

    fn login_request(oauth_id: &str) -> Request<Body> {
        let mut request = Request::builder().method("POST").uri("/api/v1/login");
        for (k, v) in principal_headers(oauth_id) {
            request = request.header(k, v);
        }
        request.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_login_bootstrap_failure() {
        let app = TestApp::new();
        app.publisher.fail_next_copies(5);
        let response = app.send(login_request("oid-4")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(app.store.find_user("oid-4").await.unwrap().is_none());

        let response = app.send(login_request("oid-4")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let user = app.store.find_user("oid-4").await.unwrap().unwrap();
        for file in TEMPLATE_FILES {
            assert!(app.publisher.get(&user.storage_account, file).is_some());
        }
    }

    #[tokio::test]
    async fn test_login_provisions_account_before_copying() {
        let app = TestApp::new();
        let user = app.login("oid-5").await;
        let events = app.publisher.events();
        assert_eq!(events[0], format!("provision {}", user.storage_account));
        assert!(events[1..]
            .iter()
            .all(|e| e.starts_with(&format!("copy {} ", user.storage_account))));
    }

    #[tokio::test]
    async fn test_login_provisioning_failure() {
        let app = TestApp::new();
        app.publisher.fail_next_provision();
        let response = app.send(login_request("oid-6")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response)
            .await
            .contains("Failed to bootstrap static website"));
        assert_eq!(app.publisher.copy_attempts(), 0);
        assert!(app.store.find_user("oid-6").await.unwrap().is_none());
    }
}
