//! Gemini client implementation

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ChatConfig;
use crate::constants::DEFAULT_GEMINI_API_PATH;
use crate::domain::ChatMessage;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::ChatBackend;
use crate::infrastructure::model::types::ModelError;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Gemini client for Google AI
#[derive(Clone)]
pub struct GeminiClient {
    base: HttpClientBase,
    model: String,
}

impl GeminiClient {
    pub fn from_config(config: &ChatConfig) -> Result<Self, ModelError> {
        let api_key = resolve_api_key("gemini", config.api_key.as_deref());
        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_ENDPOINT.to_string());
        Ok(Self {
            base: HttpClientBase::new("gemini".into(), endpoint, api_key, config.timeout)?,
            model: config.model.clone(),
        })
    }

    fn build_model_url(&self) -> String {
        self.base.build_url(&format!(
            "{DEFAULT_GEMINI_API_PATH}/{}:generateContent",
            self.model
        ))
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    fn provider(&self) -> &str {
        &self.base.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let url = self.build_model_url();
        let (system_text, contents) = MessageAdapter::to_gemini_format(messages);

        let mut payload = json!({ "contents": contents });
        if let Some(system) = system_text {
            payload["system_instruction"] = json!({
                "parts": [{"text": system}]
            });
        }

        info!(
            provider = self.base.id.as_str(),
            model = self.model.as_str(),
            messages = messages.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self.base.post_with_query_key(&url, &payload).await?;
        debug!("Received response from Gemini");

        response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .flat_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing text"))
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_url_uses_generate_content() {
        let client = GeminiClient::from_config(&ChatConfig::new("gemini", "gemini-1.5-flash"))
            .expect("client builds");
        assert_eq!(
            client.build_model_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
