use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, routing::get, Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::service::PlanService;
use crate::store::WellnessRepository;

pub mod history;
pub mod meditation;
pub mod plan;
pub mod profile;
pub mod progress;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PlanService>,
    pub repo: WellnessRepository,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// Turns axum's JSON rejection into the `{ details }` error body.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(plan::routes(state.clone()))
        .merge(meditation::routes(state.clone()))
        .merge(profile::routes(state.clone()))
        .merge(history::routes(state.clone()))
        .merge(progress::routes(state))
        .route("/health", get(|| async { "✅ Carely backend up" }))
        .layer(CorsLayer::permissive())
}
