//! Provider factory - creates chat backends from config

use super::clients::{
    AnthropicClient, GeminiClient, HuggingFaceClient, MISTRAL_ENDPOINT, OPENAI_ENDPOINT,
    OllamaClient, OpenAIClient,
};
use super::traits::ChatBackend;
use super::types::ModelError;
use crate::config::ChatConfig;
use std::env;
use tracing::{debug, warn};

/// Resolve API key from environment variable
pub fn resolve_api_key(provider: &str, var_name: Option<&str>) -> Option<String> {
    let raw = var_name.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    match env::var(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                provider,
                env_var = raw,
                %err,
                "API key environment variable is not set"
            );
            None
        }
    }
}

/// Factory for creating chat backends from the `[chat]` section.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a chat backend based on the provider name.
    ///
    /// Supported names (case-insensitive):
    /// - `openai`, `mistral` → OpenAI chat completions format
    /// - `anthropic` → Messages API
    /// - `ollama`, `localai` → Ollama format
    /// - `hf`, `huggingface` → Inference API text generation
    /// - `gemini`, `google`, `google-ai` → Gemini format
    pub fn create(config: &ChatConfig) -> Result<Box<dyn ChatBackend>, ModelError> {
        let provider = config.provider.trim().to_lowercase();
        debug!(
            provider = provider.as_str(),
            model = config.model.as_str(),
            "Creating chat backend"
        );
        let backend: Box<dyn ChatBackend> = match provider.as_str() {
            "openai" => Box::new(OpenAIClient::from_config(config, OPENAI_ENDPOINT)?),
            "mistral" => Box::new(OpenAIClient::from_config(config, MISTRAL_ENDPOINT)?),
            "anthropic" => Box::new(AnthropicClient::from_config(config)?),
            "ollama" | "localai" => Box::new(OllamaClient::from_config(config)?),
            "hf" | "huggingface" => Box::new(HuggingFaceClient::from_config(config)?),
            "gemini" | "google" | "google-ai" => Box::new(GeminiClient::from_config(config)?),
            _ => return Err(ModelError::unsupported_provider(&config.provider)),
        };
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_the_same_backend() {
        for name in ["ollama", "LocalAI"] {
            let backend = ProviderFactory::create(&ChatConfig::new(name, "llama3"))
                .expect("backend builds");
            assert_eq!(backend.provider(), "ollama");
            assert_eq!(backend.model(), "llama3");
        }
        let backend = ProviderFactory::create(&ChatConfig::new("Google", "gemini-1.5-flash"))
            .expect("backend builds");
        assert_eq!(backend.provider(), "gemini");
        let backend = ProviderFactory::create(&ChatConfig::new("mistral", "mistral-small"))
            .expect("backend builds");
        assert_eq!(backend.provider(), "mistral");
    }

    #[test]
    fn unknown_providers_are_rejected() {
        let err = ProviderFactory::create(&ChatConfig::new("cohere", "command"))
            .err()
            .expect("provider unsupported");
        assert!(matches!(
            err,
            ModelError::UnsupportedProvider { provider } if provider == "cohere"
        ));
    }

    #[test]
    fn blank_key_names_resolve_to_none() {
        assert_eq!(resolve_api_key("openai", None), None);
        assert_eq!(resolve_api_key("openai", Some("  ")), None);
        assert_eq!(
            resolve_api_key("openai", Some("ARDF_MCP_TEST_KEY_THAT_IS_NEVER_SET")),
            None
        );
    }
}
