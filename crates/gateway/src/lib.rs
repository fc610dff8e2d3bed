//! # OKR School Gateway
//!
//! JSON over HTTP in front of `OkrCore`. `POST /api/login` hands out a
//! token; every other route reads `Authorization: Bearer <token>`.
//!
//! Routes are grouped by module and merged in `create_router`:
//! - `session_endpoints`: health, login, logout, me, own password
//! - `admin_endpoints`: users, classes, periods, parent links, import, audit
//! - `okr_endpoints`: OKRs, delete requests, progress, reviews, children

use axum::http::{header, HeaderMap};
use axum::Router;
use okr_core::OkrCore;
use std::sync::Arc;
use store::SchoolStore;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod admin_endpoints;
mod http_error;
mod okr_endpoints;
mod session_endpoints;

pub use http_error::HttpError;

/// Application state shared across all endpoints.
///
/// `OkrCore` is single-writer; the mutex serializes every request.
pub struct AppState<S> {
    pub core: Arc<Mutex<OkrCore<S>>>,
}

impl<S> AppState<S> {
    pub fn new(core: OkrCore<S>) -> Self {
        Self {
            core: Arc::new(Mutex::new(core)),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

/// Bound shared by every handler
pub trait Backend: SchoolStore + Send + 'static {}

impl<S: SchoolStore + Send + 'static> Backend for S {}

pub fn create_router<S: Backend>(state: AppState<S>) -> Router {
    Router::new()
        .merge(session_endpoints::routes::<S>())
        .merge(admin_endpoints::routes::<S>())
        .merge(okr_endpoints::routes::<S>())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Bind `addr` and serve until the process stops
pub async fn serve<S: Backend>(core: OkrCore<S>, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, create_router(AppState::new(core))).await
}

/// Token from `Authorization: Bearer <token>`
pub(crate) fn bearer(headers: &HeaderMap) -> Result<&str, HttpError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| HttpError::from(shared::OkrError::Unauthenticated))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use shared::AppConfig;
    use store::InMemoryStore;
    use tower::ServiceExt;

    /// Router over an empty school with one admin (`admin@school.vn` / `admin-pass`)
    pub fn app() -> Router {
        app_with(&AppConfig::default())
    }

    pub fn app_with(config: &AppConfig) -> Router {
        let mut core = OkrCore::new(InMemoryStore::new(), config);
        core.bootstrap_admin("admin@school.vn", "Quản trị", "admin-pass")
            .unwrap();
        create_router(AppState::new(core))
    }

    pub async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Admin token plus a class 10A1 taught by gv@, student hs@ in it,
    /// parent ph@ linked to hs@ and an open period HK1
    pub async fn school(app: &Router) -> String {
        let admin = login(app, "admin@school.vn", "admin-pass").await;
        let users = [
            json!({ "email": "gv@school.vn", "name": "Cô Lan", "role": "teacher", "password": "gv-pass" }),
            json!({ "email": "hs@school.vn", "name": "Minh", "role": "student", "className": "10A1", "password": "hs-pass" }),
            json!({ "email": "ph@school.vn", "name": "Bố Minh", "role": "parent", "password": "ph-pass" }),
        ];
        for user in users {
            let (status, body) = call(app, Method::POST, "/api/users", Some(&admin), Some(user)).await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
        }

        let setup = [
            ("/api/classes", json!({ "name": "10A1", "teacherEmail": "gv@school.vn", "size": 40 })),
            ("/api/periods", json!({ "id": "HK1", "name": "Học kỳ 1" })),
            ("/api/relationships", json!({ "studentEmail": "hs@school.vn", "parentEmail": "ph@school.vn" })),
        ];
        for (uri, body) in setup {
            let (status, body) = call(app, Method::POST, uri, Some(&admin), Some(body)).await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
        }
        admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer() {
        let mut headers = HeaderMap::new();
        assert!(bearer(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer(&headers).unwrap(), "abc");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer(&headers).unwrap_err().code, "UNAUTHENTICATED");
    }
}
