use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use super::{json_body, AppState, UserQuery};
use crate::error::ApiError;
use crate::models::{MeditationEntry, MeditationRequest, MeditationResponse, NewMeditationEntry};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-meditation", post(generate_meditation))
        .route("/api/meditations", post(save_meditation).get(get_meditations))
        .with_state(state)
}

async fn generate_meditation(
    State(state): State<AppState>,
    payload: Result<Json<MeditationRequest>, JsonRejection>,
) -> Result<Json<MeditationResponse>, ApiError> {
    let req = json_body(payload)?;
    let meditation = state.service.generate_meditation(&req).await?;
    Ok(Json(MeditationResponse {
        meditation,
        duration: req.duration,
    }))
}

async fn save_meditation(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    payload: Result<Json<NewMeditationEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<MeditationEntry>), ApiError> {
    let entry = state
        .repo
        .save_meditation(query.user_id, json_body(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get_meditations(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<MeditationEntry>>, ApiError> {
    Ok(Json(state.repo.get_meditation_history(query.user_id).await?))
}
