//! # LLM Module
//!
//! The model-service boundary. `GeminiSession` implements the domain's
//! `ModelSession` trait over the provider's HTTP API; `ProviderConfig`
//! resolves the credential and endpoint from application configuration.

pub mod gemini;

pub use gemini::GeminiSession;

use crate::domain::config::AgentConfig;
use crate::domain::errors::UpstreamError;

/// Resolved connection settings for a provider.
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key, read from the environment unless set inline.
    pub api_key: String,
    /// Base URL (for non-default endpoints).
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: String,
}

impl ProviderConfig {
    pub fn from_agent_config(config: &AgentConfig) -> Result<Self, UpstreamError> {
        let api_key = if let Some(key) = &config.api_key {
            key.clone()
        } else if let Some(env_var) = &config.api_key_env {
            std::env::var(env_var).map_err(|e| {
                UpstreamError::new(
                    &config.provider,
                    format!("API key env var {} not set: {}", env_var, e),
                )
            })?
        } else {
            return Err(UpstreamError::new(
                &config.provider,
                "No API key provided - set api_key or api_key_env",
            ));
        };

        Ok(Self {
            api_key,
            base_url: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }
}
