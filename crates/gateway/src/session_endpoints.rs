//! Session endpoints
//!
//! - `GET /api/health`
//! - `POST /api/login`
//! - `POST /api/logout`
//! - `GET /api/me`
//! - `POST /api/password`

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use okr_core::Session;
use serde::{Deserialize, Serialize};
use shared::User;

use crate::{bearer, AppState, Backend, HttpError};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordInput {
    pub old_password: String,
    pub new_password: String,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn login<S: Backend>(
    State(state): State<AppState<S>>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Session>, HttpError> {
    let session = state.core.lock().await.login(&input.email, &input.password)?;
    Ok(Json(session))
}

async fn logout<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<StatusCode, HttpError> {
    let token = bearer(&headers)?;
    state.core.lock().await.logout(token)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<User>, HttpError> {
    let token = bearer(&headers)?;
    let user = state.core.lock().await.me(token)?;
    Ok(Json(user))
}

async fn change_password<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(input): Json<PasswordInput>,
) -> Result<StatusCode, HttpError> {
    let token = bearer(&headers)?;
    state
        .core
        .lock()
        .await
        .change_password(token, &input.old_password, &input.new_password)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes<S: Backend>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/login", post(login::<S>))
        .route("/api/logout", post(logout::<S>))
        .route("/api/me", get(me::<S>))
        .route("/api/password", post(change_password::<S>))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{app, app_with, call, login};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::AppConfig;

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_login_me_logout() {
        let app = app();
        let token = login(&app, "admin@school.vn", "admin-pass").await;

        let (status, body) = call(&app, Method::GET, "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "admin");
        assert!(body.get("passwordHash").is_none());

        let (status, _) = call(&app, Method::POST, "/api/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&app, Method::GET, "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let app = app_with(&AppConfig {
            session_ttl_secs: 0,
            ..Default::default()
        });
        let token = login(&app, "admin@school.vn", "admin-pass").await;

        let (status, body) = call(&app, Method::GET, "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_wrong_password_then_lockout() {
        let app = app();
        let wrong = json!({ "email": "admin@school.vn", "password": "nope" });

        let (status, body) = call(&app, Method::POST, "/api/login", None, Some(wrong.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_CREDENTIALS");

        let mut last = StatusCode::OK;
        for _ in 0..10 {
            last = call(&app, Method::POST, "/api/login", None, Some(wrong.clone())).await.0;
        }
        assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_change_password() {
        let app = app();
        let token = login(&app, "admin@school.vn", "admin-pass").await;

        let input = json!({ "oldPassword": "admin-pass", "newPassword": "moi" });
        let (status, _) = call(&app, Method::POST, "/api/password", Some(&token), Some(input)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        login(&app, "admin@school.vn", "moi").await;
    }
}
