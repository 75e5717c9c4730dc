use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

mod config;
mod decoder;
mod error;
mod llm;
mod models;
mod prompts;
mod routes;
mod service;
mod store;

use config::Config;
use llm::GeminiProvider;
use routes::AppState;
use service::PlanService;
use store::{KeyValueStore, MemoryStore, PgStore, WellnessRepository};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn KeyValueStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("🗄️ Using Postgres storage");
            Arc::new(PgStore::connect(url).await?)
        }
        None => {
            tracing::info!("🗄️ DATABASE_URL not set, using in-memory storage");
            Arc::new(MemoryStore::new())
        }
    };

    let provider = GeminiProvider::new(config.api_key.clone(), config.api_base.clone());
    tracing::info!("🤖 Model candidates: {}", config.models.join(", "));

    let state = AppState {
        service: Arc::new(PlanService::new(Arc::new(provider), config.models.clone())),
        repo: WellnessRepository::new(store),
    };

    let app = routes::router(state);

    tracing::info!("🧠 Server running at {}", config.addr);

    axum::serve(
        tokio::net::TcpListener::bind(config.addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
