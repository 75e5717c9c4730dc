//! Text-generation model client.
//!
//! A [`ModelProvider`] turns a model identifier into a ready [`TextModel`];
//! initialisation may fail per model, which is what the service's fallback
//! list walks over. [`GeminiProvider`] talks to the Google Generative
//! Language REST API.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The key travels in a header so request URLs (and errors quoting them)
/// never contain it.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model {model} failed to initialize: {reason}")]
    Init { model: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait TextModel: Send + Sync {
    fn id(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn init_model(&self, model_id: &str) -> Result<Box<dyn TextModel>, ModelError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Http(err.without_url())
    }
}

fn api_error(status: u16, body: &str) -> ModelError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_owned());
    ModelError::Api { status, message }
}

/// Joins the text parts of the first candidate.
fn response_text(body: &str) -> Result<String, ModelError> {
    let parsed: GenerateResponse = serde_json::from_str(body).map_err(|e| ModelError::Api {
        status: 200,
        message: format!("unreadable response: {e}"),
    })?;

    if let Some(err) = parsed.error {
        return Err(ModelError::Api {
            status: 200,
            message: err.message,
        });
    }

    let text: String = parsed
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(ModelError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    api_base: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_owned(),
        }
    }

    fn model_url(&self, model_id: &str, method: Option<&str>) -> String {
        match method {
            Some(method) => format!("{}/models/{model_id}:{method}", self.api_base),
            None => format!("{}/models/{model_id}", self.api_base),
        }
    }
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    #[instrument(skip(self))]
    async fn init_model(&self, model_id: &str) -> Result<Box<dyn TextModel>, ModelError> {
        let init_err = |reason: String| ModelError::Init {
            model: model_id.to_owned(),
            reason,
        };

        let response = self
            .client
            .get(self.model_url(model_id, None))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| init_err(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(init_err(api_error(status.as_u16(), &body).to_string()));
        }

        debug!("model available");
        Ok(Box::new(GeminiModel {
            provider: self.clone(),
            model_id: model_id.to_owned(),
        }))
    }
}

pub struct GeminiModel {
    provider: GeminiProvider,
    model_id: String,
}

#[async_trait]
impl TextModel for GeminiModel {
    fn id(&self) -> &str {
        &self.model_id
    }

    #[instrument(skip(self, prompt), fields(model = %self.model_id))]
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .provider
            .client
            .post(self.provider.model_url(&self.model_id, Some("generateContent")))
            .header(API_KEY_HEADER, &self.provider.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "generateContent failed");
            return Err(api_error(status.as_u16(), &body));
        }

        response_text(&body)
    }
}
