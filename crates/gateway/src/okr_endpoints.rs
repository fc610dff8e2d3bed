//! OKR, progress and review endpoints
//!
//! - `GET|POST /api/okrs`, `PUT /api/okrs/:id`, `PUT /api/okrs/:id/actual`
//! - `POST /api/okrs/:id/approve|reject|delete-request|resolve-delete`
//! - `GET /api/delete-requests`
//! - `GET /api/classes/:name/students`, `GET /api/classes/:name/summary/:period`
//! - `GET /api/students/:email/okrs`, `GET /api/students/:email/progress/:period`
//! - `GET /api/reviews/:student/:period`
//! - `PUT /api/reviews/:student/:period/teacher-comment|parent-comment`
//! - `POST /api/reviews/:student/:period/send`
//! - `GET /api/children`

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post, put},
    Router,
};
use okr_core::DeleteDecision;
use serde::Deserialize;
use shared::{ClassSummary, FinalReview, Okr, OkrDraft, StudentProgress, User};

use crate::{bearer, AppState, Backend, HttpError};

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualInput {
    pub actual_value: f64,
}

#[derive(Debug, Deserialize)]
pub struct DecisionInput {
    pub decision: DeleteDecision,
}

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub comment: String,
}

// ============== Student ==============

async fn own_okrs<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<Okr>>, HttpError> {
    let token = bearer(&headers)?;
    let okrs = state
        .core
        .lock()
        .await
        .own_okrs(token, query.period.as_deref())?;
    Ok(Json(okrs))
}

async fn create_okr<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(draft): Json<OkrDraft>,
) -> Result<(StatusCode, Json<Okr>), HttpError> {
    let token = bearer(&headers)?;
    let okr = state.core.lock().await.create_okr(token, draft)?;
    Ok((StatusCode::CREATED, Json(okr)))
}

async fn update_okr<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(draft): Json<OkrDraft>,
) -> Result<Json<Okr>, HttpError> {
    let token = bearer(&headers)?;
    let okr = state.core.lock().await.update_okr(token, &id, draft)?;
    Ok(Json(okr))
}

async fn update_actual<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ActualInput>,
) -> Result<Json<Okr>, HttpError> {
    let token = bearer(&headers)?;
    let okr = state
        .core
        .lock()
        .await
        .update_actual(token, &id, input.actual_value)?;
    Ok(Json(okr))
}

async fn request_deletion<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Okr>, HttpError> {
    let token = bearer(&headers)?;
    let okr = state.core.lock().await.request_okr_deletion(token, &id)?;
    Ok(Json(okr))
}

// ============== Homeroom teacher ==============

async fn approve_okr<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Okr>, HttpError> {
    let token = bearer(&headers)?;
    let okr = state.core.lock().await.approve_okr(token, &id)?;
    Ok(Json(okr))
}

async fn reject_okr<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Okr>, HttpError> {
    let token = bearer(&headers)?;
    let okr = state.core.lock().await.reject_okr(token, &id)?;
    Ok(Json(okr))
}

async fn resolve_delete<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<DecisionInput>,
) -> Result<Json<Option<Okr>>, HttpError> {
    let token = bearer(&headers)?;
    let okr = state
        .core
        .lock()
        .await
        .resolve_delete_request(token, &id, input.decision)?;
    Ok(Json(okr))
}

async fn delete_requests<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Okr>>, HttpError> {
    let token = bearer(&headers)?;
    let okrs = state.core.lock().await.pending_delete_requests(token)?;
    Ok(Json(okrs))
}

async fn class_students<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<Vec<User>>, HttpError> {
    let token = bearer(&headers)?;
    let students = state.core.lock().await.list_class_students(token, &name)?;
    Ok(Json(students))
}

async fn class_summary<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path((name, period)): Path<(String, String)>,
) -> Result<Json<ClassSummary>, HttpError> {
    let token = bearer(&headers)?;
    let summary = state.core.lock().await.class_summary(token, &name, &period)?;
    Ok(Json(summary))
}

// ============== Any role, within scope ==============

async fn student_okrs<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(email): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<Okr>>, HttpError> {
    let token = bearer(&headers)?;
    let okrs = state
        .core
        .lock()
        .await
        .student_okrs(token, &email, query.period.as_deref())?;
    Ok(Json(okrs))
}

async fn student_progress<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path((email, period)): Path<(String, String)>,
) -> Result<Json<StudentProgress>, HttpError> {
    let token = bearer(&headers)?;
    let progress = state
        .core
        .lock()
        .await
        .student_progress(token, &email, &period)?;
    Ok(Json(progress))
}

async fn final_review<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path((student, period)): Path<(String, String)>,
) -> Result<Json<Option<FinalReview>>, HttpError> {
    let token = bearer(&headers)?;
    let review = state.core.lock().await.final_review(token, &student, &period)?;
    Ok(Json(review))
}

async fn teacher_comment<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path((student, period)): Path<(String, String)>,
    Json(input): Json<CommentInput>,
) -> Result<Json<FinalReview>, HttpError> {
    let token = bearer(&headers)?;
    let review = state
        .core
        .lock()
        .await
        .write_teacher_comment(token, &student, &period, &input.comment)?;
    Ok(Json(review))
}

async fn parent_comment<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path((student, period)): Path<(String, String)>,
    Json(input): Json<CommentInput>,
) -> Result<Json<FinalReview>, HttpError> {
    let token = bearer(&headers)?;
    let review = state
        .core
        .lock()
        .await
        .write_parent_comment(token, &student, &period, &input.comment)?;
    Ok(Json(review))
}

async fn send_review<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path((student, period)): Path<(String, String)>,
) -> Result<Json<FinalReview>, HttpError> {
    let token = bearer(&headers)?;
    let review = state
        .core
        .lock()
        .await
        .mark_review_sent(token, &student, &period)?;
    Ok(Json(review))
}

async fn children<S: Backend>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, HttpError> {
    let token = bearer(&headers)?;
    let children = state.core.lock().await.children(token)?;
    Ok(Json(children))
}

pub fn routes<S: Backend>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/okrs", get(own_okrs::<S>).post(create_okr::<S>))
        .route("/api/okrs/:id", put(update_okr::<S>))
        .route("/api/okrs/:id/actual", put(update_actual::<S>))
        .route("/api/okrs/:id/approve", post(approve_okr::<S>))
        .route("/api/okrs/:id/reject", post(reject_okr::<S>))
        .route("/api/okrs/:id/delete-request", post(request_deletion::<S>))
        .route("/api/okrs/:id/resolve-delete", post(resolve_delete::<S>))
        .route("/api/delete-requests", get(delete_requests::<S>))
        .route("/api/classes/:name/students", get(class_students::<S>))
        .route("/api/classes/:name/summary/:period", get(class_summary::<S>))
        .route("/api/students/:email/okrs", get(student_okrs::<S>))
        .route("/api/students/:email/progress/:period", get(student_progress::<S>))
        .route("/api/reviews/:student/:period", get(final_review::<S>))
        .route(
            "/api/reviews/:student/:period/teacher-comment",
            put(teacher_comment::<S>),
        )
        .route(
            "/api/reviews/:student/:period/parent-comment",
            put(parent_comment::<S>),
        )
        .route("/api/reviews/:student/:period/send", post(send_review::<S>))
        .route("/api/children", get(children::<S>))
}
