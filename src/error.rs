use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::decoder::DecodeError;
use crate::llm::ModelError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no candidate model initialized (tried: {})", .tried.join(", "))]
    ModelUnavailable { tried: Vec<String> },

    #[error("model {model} failed during generation: {source}")]
    ModelCallFailed {
        model: String,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    InvalidAiResponse(#[from] DecodeError),
}

/// Boundary error: a status plus a message that is safe to show the user.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    details: String,
}

impl ApiError {
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            details: details.into(),
        }
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            details: details.into(),
        }
    }

    fn internal(details: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            details: details.to_owned(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::ModelUnavailable { .. } => {
                tracing::error!("❌ {err}");
                ApiError::internal("The AI service is currently unavailable. Please try again later.")
            }
            ServiceError::ModelCallFailed { .. } => {
                tracing::error!("❌ {err}");
                ApiError::internal("Failed to reach the AI service. Please try again.")
            }
            ServiceError::InvalidAiResponse(decode) => {
                tracing::error!(raw = %decode.raw(), "❌ {err}");
                ApiError::internal("AI produced an invalid response, please try again.")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!("❌ Storage error: {err}");
        ApiError::internal("Storage error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "details": self.details });
        (self.status, Json(body)).into_response()
    }
}
