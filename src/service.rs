use std::sync::Arc;

use tracing::{info, warn};

use crate::decoder;
use crate::error::ServiceError;
use crate::llm::{ModelProvider, TextModel};
use crate::models::{HealthProfile, MeditationRequest, MeditationScript, WellnessPlan};
use crate::prompts;

/// Renders a prompt, picks the first model that initializes, and decodes
/// its answer once. Holds no per-request state.
#[derive(Clone)]
pub struct PlanService {
    provider: Arc<dyn ModelProvider>,
    candidates: Vec<String>,
}

impl PlanService {
    pub fn new(provider: Arc<dyn ModelProvider>, candidates: Vec<String>) -> Self {
        Self { provider, candidates }
    }

    /// Availability is probed on every call; nothing is cached.
    pub async fn select_model(&self) -> Result<Box<dyn TextModel>, ServiceError> {
        for id in &self.candidates {
            match self.provider.init_model(id).await {
                Ok(model) => return Ok(model),
                Err(e) => warn!("⚠️ Model {id} unavailable: {e}"),
            }
        }
        Err(ServiceError::ModelUnavailable {
            tried: self.candidates.clone(),
        })
    }

    /// One generation call; the caller decodes the raw text exactly once.
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let model = self.select_model().await?;
        info!("🧠 Generating with {}", model.id());

        model
            .generate(prompt)
            .await
            .map_err(|source| ServiceError::ModelCallFailed {
                model: model.id().to_owned(),
                source,
            })
    }

    pub async fn generate_plan(&self, profile: &HealthProfile) -> Result<WellnessPlan, ServiceError> {
        let raw = self.complete(&prompts::plan_prompt(profile)).await?;
        Ok(decoder::decode_plan(&raw)?)
    }

    pub async fn generate_meditation(
        &self,
        req: &MeditationRequest,
    ) -> Result<MeditationScript, ServiceError> {
        let raw = self.complete(&prompts::meditation_prompt(req)).await?;
        Ok(decoder::decode_meditation(&raw)?)
    }
}
