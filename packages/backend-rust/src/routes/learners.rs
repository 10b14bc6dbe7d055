use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use affinity_algo::{LearnerProfile, LearningPatterns};

use crate::response::{AppError, SuccessResponse};
use crate::routes::{parse_json, parse_query};
use crate::state::AppState;

const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
const MAX_RECOMMENDATION_LIMIT: usize = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_learner).put(put_learner))
        .route("/:id/affinity/:content_id", get(get_affinity))
        .route("/:id/recommendations", get(get_recommendations))
        .route("/:id/assignments", get(get_assignments))
}

/// Profile body; the id comes from the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearnerProfileBody {
    knowledge_state: Vec<f64>,
    #[serde(default)]
    learning_patterns: LearningPatterns,
    learning_preferences: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    limit: Option<usize>,
}

async fn get_learner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.affinity().get_learner(&id).await?;
    Ok(SuccessResponse::ok(profile))
}

async fn put_learner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<LearnerProfileBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = parse_json(payload)?;
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::validation("learner id 不能为空"));
    }

    let profile = LearnerProfile {
        id: id.to_string(),
        knowledge_state: body.knowledge_state,
        learning_patterns: body.learning_patterns,
        learning_preferences: body.learning_preferences,
    };

    let saved = state.affinity().save_learner(profile).await?;
    Ok(SuccessResponse::ok(saved))
}

async fn get_affinity(
    State(state): State<AppState>,
    Path((id, content_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let breakdown = state.affinity().calculate_affinity(&id, &content_id).await?;
    Ok(SuccessResponse::ok(breakdown))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let query = parse_query(query)?;
    let limit = query.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT);
    if limit == 0 || limit > MAX_RECOMMENDATION_LIMIT {
        return Err(AppError::validation(format!(
            "limit 必须在 1 到 {MAX_RECOMMENDATION_LIMIT} 之间"
        )));
    }

    let ranked = state.affinity().recommend_for_learner(&id, limit).await?;
    Ok(SuccessResponse::ok(ranked))
}

async fn get_assignments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let assignments = state.affinity().get_assignments_for_learner(&id).await?;
    Ok(SuccessResponse::ok(assignments))
}
