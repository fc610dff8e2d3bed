//! Admin endpoints
//!
//! - `GET|POST /api/users`, `PATCH|DELETE /api/users/:email`
//! - `PUT /api/users/:email/email`, `PUT /api/users/:email/password`
//! - `GET|POST /api/classes`, `PATCH|DELETE /api/classes/:name`
//! - `GET|POST /api/periods`, `DELETE /api/periods/:id`
//! - `POST /api/periods/:id/open`, `POST /api/periods/:id/close`
//! - `GET|POST|DELETE /api/relationships`
//! - `POST /api/import/users`, `POST /api/import/parents`
//! - `GET /api/audit` (`?limit=`, `?denials=true`, `?actor=`), `GET /api/audit/stats`

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post, put},
    Router,
};
use okr_core::{AuditEntry, AuditStats, CascadeReport, ImportReport, NewUser, UserFilter};
use roster::{ParentRow, UserRow};
use serde::Deserialize;
use shared::{Class, ClassPatch, Period, Relationship, User, UserPatch};

use crate::{bearer, AppState, Backend, HttpError};

#[derive(Debug, Deserialize)]
pub struct EmailInput {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordReset {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPeriod {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Only permission denials
    #[serde(default)]
    pub denials: bool,
    /// Only entries of this email
    pub actor: Option<String>,
}

fn default_limit() -> usize {
    100
}

// ============== Users ==============

async fn list_users<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>, HttpError> {
    let token = bearer(&headers)?;
    let users = state.core.lock().await.list_users(token, &filter)?;
    Ok(Json(users))
}

async fn create_user<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), HttpError> {
    let token = bearer(&headers)?;
    let user = state.core.lock().await.create_user(token, input)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(email): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, HttpError> {
    let token = bearer(&headers)?;
    let user = state.core.lock().await.update_user(token, &email, patch)?;
    Ok(Json(user))
}

async fn delete_user<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> Result<Json<CascadeReport>, HttpError> {
    let token = bearer(&headers)?;
    let report = state.core.lock().await.delete_user(token, &email)?;
    Ok(Json(report))
}

async fn rename_email<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(email): Path<String>,
    Json(input): Json<EmailInput>,
) -> Result<Json<User>, HttpError> {
    let token = bearer(&headers)?;
    let user = state.core.lock().await.rename_email(token, &email, &input.email)?;
    Ok(Json(user))
}

async fn reset_password<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(email): Path<String>,
    Json(input): Json<PasswordReset>,
) -> Result<StatusCode, HttpError> {
    let token = bearer(&headers)?;
    state
        .core
        .lock()
        .await
        .reset_password(token, &email, &input.password)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============== Classes ==============

async fn list_classes<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Class>>, HttpError> {
    let token = bearer(&headers)?;
    let classes = state.core.lock().await.list_classes(token)?;
    Ok(Json(classes))
}

async fn create_class<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(class): Json<Class>,
) -> Result<(StatusCode, Json<Class>), HttpError> {
    let token = bearer(&headers)?;
    let class = state.core.lock().await.create_class(token, class)?;
    Ok((StatusCode::CREATED, Json(class)))
}

async fn update_class<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(patch): Json<ClassPatch>,
) -> Result<Json<Class>, HttpError> {
    let token = bearer(&headers)?;
    let class = state.core.lock().await.update_class(token, &name, patch)?;
    Ok(Json(class))
}

async fn delete_class<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<StatusCode, HttpError> {
    let token = bearer(&headers)?;
    state.core.lock().await.delete_class(token, &name)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============== Periods ==============

async fn list_periods<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Period>>, HttpError> {
    let token = bearer(&headers)?;
    let periods = state.core.lock().await.list_periods(token)?;
    Ok(Json(periods))
}

async fn create_period<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(input): Json<NewPeriod>,
) -> Result<(StatusCode, Json<Period>), HttpError> {
    let token = bearer(&headers)?;
    let period = state
        .core
        .lock()
        .await
        .create_period(token, &input.id, &input.name)?;
    Ok((StatusCode::CREATED, Json(period)))
}

async fn open_period<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Period>, HttpError> {
    let token = bearer(&headers)?;
    let period = state.core.lock().await.open_period(token, &id)?;
    Ok(Json(period))
}

async fn close_period<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Period>, HttpError> {
    let token = bearer(&headers)?;
    let period = state.core.lock().await.close_period(token, &id)?;
    Ok(Json(period))
}

async fn delete_period<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    let token = bearer(&headers)?;
    state.core.lock().await.delete_period(token, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============== Parent links ==============

async fn list_relationships<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Relationship>>, HttpError> {
    let token = bearer(&headers)?;
    let links = state.core.lock().await.list_relationships(token)?;
    Ok(Json(links))
}

async fn link_parent<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(link): Json<Relationship>,
) -> Result<(StatusCode, Json<Relationship>), HttpError> {
    let token = bearer(&headers)?;
    let link = state
        .core
        .lock()
        .await
        .link_parent(token, &link.student_email, &link.parent_email)?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn unlink_parent<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(link): Json<Relationship>,
) -> Result<StatusCode, HttpError> {
    let token = bearer(&headers)?;
    state
        .core
        .lock()
        .await
        .unlink_parent(token, &link.student_email, &link.parent_email)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============== Import ==============

async fn import_users<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(rows): Json<Vec<UserRow>>,
) -> Result<Json<ImportReport>, HttpError> {
    let token = bearer(&headers)?;
    let report = state.core.lock().await.import_users(token, &rows)?;
    Ok(Json(report))
}

async fn import_parents<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(rows): Json<Vec<ParentRow>>,
) -> Result<Json<ImportReport>, HttpError> {
    let token = bearer(&headers)?;
    let report = state.core.lock().await.import_relationships(token, &rows)?;
    Ok(Json(report))
}

// ============== Audit ==============

async fn audit_log<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, HttpError> {
    let token = bearer(&headers)?;
    let mut core = state.core.lock().await;
    let entries = match (&query.actor, query.denials) {
        (Some(actor), _) => core.audit_for_actor(token, actor, query.limit)?,
        (None, true) => core.audit_denials(token, query.limit)?,
        (None, false) => core.audit_recent(token, query.limit)?,
    };
    Ok(Json(entries))
}

async fn audit_stats<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<AuditStats>, HttpError> {
    let token = bearer(&headers)?;
    let stats = state.core.lock().await.audit_stats(token)?;
    Ok(Json(stats))
}

pub fn routes<S: Backend>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/users", get(list_users::<S>).post(create_user::<S>))
        .route(
            "/api/users/:email",
            axum::routing::patch(update_user::<S>).delete(delete_user::<S>),
        )
        .route("/api/users/:email/email", put(rename_email::<S>))
        .route("/api/users/:email/password", put(reset_password::<S>))
        .route("/api/classes", get(list_classes::<S>).post(create_class::<S>))
        .route(
            "/api/classes/:name",
            axum::routing::patch(update_class::<S>).delete(delete_class::<S>),
        )
        .route("/api/periods", get(list_periods::<S>).post(create_period::<S>))
        .route("/api/periods/:id", axum::routing::delete(delete_period::<S>))
        .route("/api/periods/:id/open", post(open_period::<S>))
        .route("/api/periods/:id/close", post(close_period::<S>))
        .route(
            "/api/relationships",
            get(list_relationships::<S>)
                .post(link_parent::<S>)
                .delete(unlink_parent::<S>),
        )
        .route("/api/import/users", post(import_users::<S>))
        .route("/api/import/parents", post(import_parents::<S>))
        .route("/api/audit", get(audit_log::<S>))
        .route("/api/audit/stats", get(audit_stats::<S>))
}
