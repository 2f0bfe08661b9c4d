//! # Chat backend configuration
//!
//! The `[chat]` section selects the text-generation backend the agent talks
//! to. Supported provider names:
//!
//! | Provider | Default endpoint | API key |
//! |----------|------------------|---------|
//! | `openai` | `https://api.openai.com` | Yes |
//! | `mistral` | `https://api.mistral.ai` | Yes |
//! | `anthropic` | `https://api.anthropic.com` | Yes |
//! | `ollama` | `http://localhost:11434` | No |
//! | `hf` | `https://api-inference.huggingface.co` | Optional |
//! | `gemini` | `https://generativelanguage.googleapis.com` | Yes |
//!
//! ```toml
//! [chat]
//! provider = "openai"
//! model = "gpt-4o-mini"
//! api_key = "OPENAI_API_KEY"
//! ```

use super::catalog::expand;
use super::error::ConfigError;
use crate::constants::DEFAULT_TIMEOUT_SECS;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Provider name, matched case-insensitively by the provider factory.
    pub provider: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key: Option<String>,
    /// Endpoint override; each provider has its own default.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl ChatConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct RawChat {
    provider: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl RawChat {
    pub(super) fn into_config(self) -> Result<ChatConfig, ConfigError> {
        let provider = self
            .provider
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingField {
                section: "chat",
                field: "provider",
            })?;
        let model = self
            .model
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingField {
                section: "chat",
                field: "model",
            })?;
        Ok(ChatConfig {
            provider,
            model,
            api_key: self.api_key,
            base_url: self
                .base_url
                .filter(|url| !url.trim().is_empty())
                .map(|url| expand(&url)),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}
