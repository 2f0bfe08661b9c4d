//! Anthropic Messages API client

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

pub const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com";
const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Clone)]
pub struct AnthropicClient {
    base: HttpClientBase,
    model: String,
}

impl AnthropicClient {
    pub fn from_config(config: &ChatConfig) -> Result<Self, ModelError> {
        let api_key = resolve_api_key("anthropic", config.api_key.as_deref());
        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| ANTHROPIC_ENDPOINT.to_string());
        Ok(Self {
            base: HttpClientBase::new("anthropic".into(), endpoint, api_key, config.timeout)?,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for AnthropicClient {
    fn provider(&self) -> &str {
        &self.base.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let url = self.base.build_url(MESSAGES_PATH);
        let api_key = self.base.require_api_key()?;
        let (system, turns) = MessageAdapter::to_anthropic_format(messages);

        let payload = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system,
            messages: turns,
        };

        info!(
            provider = self.base.id.as_str(),
            model = self.model.as_str(),
            messages = messages.len(),
            "Sending request to Anthropic"
        );

        let headers = [("x-api-key", api_key), ("anthropic-version", ANTHROPIC_VERSION)];
        let response: AnthropicResponse =
            self.base.post_with_headers(&url, &headers, &payload).await?;
        debug!("Received response from Anthropic");

        let text: String = response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();
        if text.is_empty() {
            return Err(ModelError::invalid_response(&self.base.id, "missing text"));
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    text: Option<String>,
}
