use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use affinity_algo::ContentItem;

use crate::response::{AppError, SuccessResponse};
use crate::routes::parse_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contents).post(create_content))
        .route("/:id", get(get_content))
}

async fn list_contents(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = state.affinity().list_contents().await?;
    Ok(SuccessResponse::ok(items))
}

async fn create_content(
    State(state): State<AppState>,
    payload: Result<Json<ContentItem>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut item = parse_json(payload)?;
    item.id = item.id.trim().to_string();
    if item.id.is_empty() {
        return Err(AppError::validation("content id 不能为空"));
    }

    let created = state.affinity().author_content(item).await?;
    Ok((StatusCode::CREATED, SuccessResponse::ok(created)))
}

async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = state.affinity().get_content(&id).await?;
    Ok(SuccessResponse::ok(item))
}
