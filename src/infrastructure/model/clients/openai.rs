//! OpenAI-compatible client implementation (OpenAI, Mistral)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ChatConfig;
use crate::domain::ChatMessage;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::ChatBackend;
use crate::infrastructure::model::types::ModelError;

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const MISTRAL_ENDPOINT: &str = "https://api.mistral.ai";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    model: String,
}

impl OpenAIClient {
    /// `default_endpoint` is used when the config has no `base_url`.
    pub fn from_config(config: &ChatConfig, default_endpoint: &str) -> Result<Self, ModelError> {
        let id = config.provider.to_lowercase();
        let api_key = resolve_api_key(&id, config.api_key.as_deref());
        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_endpoint.to_string());
        Ok(Self {
            base: HttpClientBase::new(id, endpoint, api_key, config.timeout)?,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAIClient {
    fn provider(&self) -> &str {
        &self.base.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let url = self.base.build_url(CHAT_COMPLETIONS_PATH);

        let payload = OpenAIRequest {
            model: self.model.clone(),
            messages: MessageAdapter::to_openai_format(messages),
            stream: false,
        };

        info!(
            provider = self.base.id.as_str(),
            model = self.model.as_str(),
            messages = messages.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: OpenAIResponse = self.base.post_with_bearer(&url, &payload).await?;
        debug!("Received response from OpenAI-compatible provider");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing content"))
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}
