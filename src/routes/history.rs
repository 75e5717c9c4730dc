use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::{json_body, AppState, UserQuery};
use crate::error::ApiError;
use crate::models::{NewPlanRecord, PlanRecord};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/history", get(get_history).post(save_plan))
        .with_state(state)
}

async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<PlanRecord>>, ApiError> {
    Ok(Json(state.repo.get_history(query.user_id).await?))
}

async fn save_plan(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    payload: Result<Json<NewPlanRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<PlanRecord>), ApiError> {
    let record = state
        .repo
        .save_plan_to_history(query.user_id, json_body(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    use crate::routes::testing::{app, send};
    use crate::service::testing::FakeProvider;

    #[tokio::test]
    async fn plans_are_stored_newest_first_with_date() {
        let app = app(FakeProvider::default());
        let uri = format!("/api/history?user_id={}", Uuid::new_v4());

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        for summary in ["old", "new"] {
            let (status, body) = send(
                &app,
                Method::POST,
                &uri,
                Some(json!({ "profile": { "age": "30" }, "recommendations": { "summary": summary } })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert!(body["date"].is_string());
        }

        let (_, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body[0]["recommendations"]["summary"], "new");
        assert_eq!(body[1]["recommendations"]["summary"], "old");
        assert_eq!(body[1]["profile"]["age"], "30");
    }
}
