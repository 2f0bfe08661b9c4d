//! Hugging Face Inference API client

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ChatConfig;
use crate::domain::ChatMessage;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::factory::resolve_api_key;
use crate::infrastructure::model::traits::ChatBackend;
use crate::infrastructure::model::types::ModelError;

pub const HF_ENDPOINT: &str = "https://api-inference.huggingface.co";

/// Text-generation models served by the Inference API. The key is optional.
#[derive(Clone)]
pub struct HuggingFaceClient {
    base: HttpClientBase,
    model: String,
}

impl HuggingFaceClient {
    pub fn from_config(config: &ChatConfig) -> Result<Self, ModelError> {
        let api_key = resolve_api_key("hf", config.api_key.as_deref());
        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| HF_ENDPOINT.to_string());
        Ok(Self {
            base: HttpClientBase::new("hf".into(), endpoint, api_key, config.timeout)?,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for HuggingFaceClient {
    fn provider(&self) -> &str {
        &self.base.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let url = self.base.build_url(&format!("models/{}", self.model));
        let payload = HfRequest {
            inputs: MessageAdapter::to_hf_inputs(messages),
        };

        info!(
            provider = self.base.id.as_str(),
            model = self.model.as_str(),
            messages = messages.len(),
            "Sending request to Hugging Face"
        );

        let response: Value = self
            .base
            .post_with_optional_bearer(&url, &payload)
            .await?;
        debug!("Received response from Hugging Face");

        generated_text(&response)
            .map(str::to_owned)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing generated_text"))
    }
}

#[derive(Serialize)]
struct HfRequest {
    inputs: String,
}

/// The API answers either `[{generated_text}]` or `{generated_text}`.
fn generated_text(response: &Value) -> Option<&str> {
    let entry = match response {
        Value::Array(items) => items.first()?,
        other => other,
    };
    entry.get("generated_text")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_both_response_shapes() {
        assert_eq!(generated_text(&json!([{"generated_text": "hi"}])), Some("hi"));
        assert_eq!(generated_text(&json!({"generated_text": "yo"})), Some("yo"));
        assert_eq!(generated_text(&json!([])), None);
    }
}
