use std::env;

/// Process-wide configuration loaded from the environment once, at
/// Orchestrator construction (SPEC_FULL.md §9 "replacing module-level state
/// and environment reads" — secrets are read here and passed down explicitly,
/// never re-read inside a phase).
#[derive(Debug, Clone)]
pub struct Config {
    pub open_router_api_key: String,
    pub model_id: String,
}

const DEFAULT_MODEL_ID: &str = "openai/gpt-4o-mini";

impl Config {
    /// Load `.env` (if present) then required/optional environment variables.
    /// Fails rather than guessing if `OPEN_ROUTER_API_KEY` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let open_router_api_key = env::var("OPEN_ROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingRequired("OPEN_ROUTER_API_KEY"))?;
        let model_id =
            env::var("THEODORE_MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());

        Ok(Self {
            open_router_api_key,
            model_id,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),
}
