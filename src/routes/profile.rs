use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::{json_body, AppState, UserQuery};
use crate::error::ApiError;
use crate::models::HealthProfile;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/profile", get(get_profile).put(save_profile))
        .with_state(state)
}

async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<HealthProfile>, ApiError> {
    state
        .repo
        .get_user(query.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No profile saved"))
}

async fn save_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    payload: Result<Json<HealthProfile>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    state.repo.save_user(query.user_id, &json_body(payload)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    use crate::routes::testing::{app, send};
    use crate::service::testing::FakeProvider;

    #[tokio::test]
    async fn profile_is_replaced_and_read_back() {
        let app = app(FakeProvider::default());
        let uri = format!("/api/profile?user_id={}", Uuid::new_v4());

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["details"], "No profile saved");

        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "name": "Ana", "age": 52, "conditions": ["Hypertension"] })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ana");
        assert_eq!(body["age"], "52");
        assert_eq!(body["conditions"], json!(["Hypertension"]));
    }

    #[tokio::test]
    async fn missing_user_id_is_rejected() {
        let app = app(FakeProvider::default());
        let (status, _) = send(&app, Method::GET, "/api/profile", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
