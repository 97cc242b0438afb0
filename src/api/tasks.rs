//! Task endpoints consumed by the matrix UI.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::classify::Quadrant;
use crate::store::{MatrixState, QuadrantBucket};
use crate::task::{ClassifiedTask, TaskUpdate};
use crate::todoist::ServiceError;

use super::routes::AppState;

type ApiError = (StatusCode, Json<Value>);

/// Translate a service error into a status code and JSON body.
fn error_response(err: &ServiceError) -> ApiError {
    let status = match err {
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        ServiceError::Network(_) | ServiceError::Parse(_) | ServiceError::Api { .. } => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(json!({ "error": err.to_string() })))
}

pub async fn list(State(state): State<Arc<AppState>>) -> Json<MatrixState> {
    Json(state.store.snapshot().await)
}

pub async fn matrix(State(state): State<Arc<AppState>>) -> Json<Vec<QuadrantBucket>> {
    Json(state.store.quadrants().await)
}

pub async fn refetch(State(state): State<Arc<AppState>>) -> Result<Json<MatrixState>, ApiError> {
    state
        .store
        .refetch()
        .await
        .map_err(|err| error_response(&err))?;
    Ok(Json(state.store.snapshot().await))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    /// Create directly into a quadrant; takes precedence over
    /// `priority`, mirroring the quadrant-local add form.
    #[serde(default)]
    pub quadrant: Option<Quadrant>,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ClassifiedTask>), ApiError> {
    let result = match req.quadrant {
        Some(quadrant) => state.store.create_in_quadrant(&req.content, quadrant).await,
        None => {
            state
                .store
                .create_task(&req.content, req.description, req.priority)
                .await
        }
    };
    result
        .map(|task| (StatusCode::CREATED, Json(task)))
        .map_err(|err| error_response(&err))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .update_task(&id, &update)
        .await
        .map(|()| Json(json!({ "success": true })))
        .map_err(|err| error_response(&err))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .delete_task(&id)
        .await
        .map(|()| Json(json!({ "success": true })))
        .map_err(|err| error_response(&err))
}

pub async fn close(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .complete_task(&id)
        .await
        .map(|()| Json(json!({ "success": true })))
        .map_err(|err| error_response(&err))
}

#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub quadrant: Quadrant,
}

pub async fn move_to_quadrant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<Json<MatrixState>, ApiError> {
    state
        .store
        .move_to_quadrant(&id, req.quadrant)
        .await
        .map_err(|err| error_response(&err))?;
    Ok(Json(state.store.snapshot().await))
}
