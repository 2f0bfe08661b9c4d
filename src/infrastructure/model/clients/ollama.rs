//! Ollama client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ChatConfig;
use crate::domain::ChatMessage;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ChatBackend;
use crate::infrastructure::model::types::ModelError;

pub const OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Ollama client for local LLM
#[derive(Clone)]
pub struct OllamaClient {
    base: HttpClientBase,
    model: String,
}

impl OllamaClient {
    pub fn from_config(config: &ChatConfig) -> Result<Self, ModelError> {
        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| OLLAMA_ENDPOINT.to_string());
        Ok(Self {
            base: HttpClientBase::new("ollama".into(), endpoint, None, config.timeout)?,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    fn provider(&self) -> &str {
        &self.base.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let url = self.base.build_url("/api/chat");

        let payload = OllamaRequest {
            model: self.model.clone(),
            messages: MessageAdapter::to_openai_format(messages),
            stream: false,
        };

        info!(
            provider = self.base.id.as_str(),
            model = self.model.as_str(),
            messages = messages.len(),
            "Sending request to Ollama"
        );

        let response: OllamaResponse = self.base.post_no_auth(&url, &payload).await?;
        debug!("Received response from Ollama");

        Ok(response
            .message
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing message"))?
            .content)
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}
