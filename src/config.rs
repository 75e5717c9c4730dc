use std::env;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::llm::DEFAULT_API_BASE;

const DEFAULT_MODELS: &str = "gemini-2.5-flash,gemini-2.0-flash,gemini-1.5-flash";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    /// Tried in order; the first that initializes serves the request.
    pub models: Vec<String>,
    pub database_url: Option<String>,
    pub addr: SocketAddr,
}

fn parse_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = get("GEMINI_API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let models_raw = get("GEMINI_MODELS").unwrap_or_else(|| DEFAULT_MODELS.to_owned());
        let models = parse_models(&models_raw);
        if models.is_empty() {
            return Err(ConfigError::Invalid {
                name: "GEMINI_MODELS",
                value: models_raw,
            });
        }

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let ip: IpAddr = host.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            value: host.clone(),
        })?;

        let port = match get("PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::Invalid { name: "PORT", value: p })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            api_base: get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
            models,
            database_url: get("DATABASE_URL").filter(|u| !u.is_empty()),
            addr: SocketAddr::new(ip, port),
        })
    }
}
