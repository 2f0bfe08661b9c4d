use super::types::ModelError;
use crate::domain::ChatMessage;
use async_trait::async_trait;

/// A text-generation backend: a conversation in, the assistant's reply out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ModelError>;
}
