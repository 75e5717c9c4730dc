use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};

use super::{json_body, AppState};
use crate::error::ApiError;
use crate::models::{HealthProfile, WellnessPlan};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-plan", post(generate_plan))
        .with_state(state)
}

async fn generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<HealthProfile>, JsonRejection>,
) -> Result<Json<WellnessPlan>, ApiError> {
    let profile = json_body(payload)?;
    let plan = state.service.generate_plan(&profile).await?;
    Ok(Json(plan))
}
