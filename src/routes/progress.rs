use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::{json_body, AppState, UserQuery};
use crate::error::ApiError;
use crate::models::{NewProgressEntry, ProgressEntry};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/progress",
            get(get_progress).post(log_progress).delete(clear_progress),
        )
        .with_state(state)
}

async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<ProgressEntry>>, ApiError> {
    Ok(Json(state.repo.get_progress(query.user_id).await?))
}

async fn log_progress(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    payload: Result<Json<NewProgressEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<ProgressEntry>), ApiError> {
    let entry = state
        .repo
        .save_progress_entry(query.user_id, json_body(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn clear_progress(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
    state.repo.clear_progress(query.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
