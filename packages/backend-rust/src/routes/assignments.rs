use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::{AppError, SuccessResponse};
use crate::routes::parse_json;
use crate::state::AppState;
use crate::store::AssignmentStatus;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assignment))
        .route("/:token", get(get_assignment))
        .route("/:token/status", put(update_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAssignmentRequest {
    learner_id: String,
    content_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: AssignmentStatus,
}

async fn create_assignment(
    State(state): State<AppState>,
    payload: Result<Json<CreateAssignmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = parse_json(payload)?;
    let assignment = state
        .affinity()
        .create_assignment(body.learner_id.trim(), body.content_id.trim())
        .await?;
    Ok((StatusCode::CREATED, SuccessResponse::ok(assignment)))
}

async fn get_assignment(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = state.affinity().get_assignment(&token).await?;
    Ok(SuccessResponse::ok(assignment))
}

async fn update_status(
    State(state): State<AppState>,
    Path(token): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = parse_json(payload)?;
    let assignment = state
        .affinity()
        .set_assignment_status(&token, body.status)
        .await?;
    Ok(SuccessResponse::ok(assignment))
}
