//! Model clients

mod anthropic;
mod base;
mod gemini;
mod huggingface;
mod ollama;
mod openai;

pub use anthropic::{ANTHROPIC_ENDPOINT, AnthropicClient};
pub use base::HttpClientBase;
pub use gemini::{GEMINI_ENDPOINT, GeminiClient};
pub use huggingface::{HF_ENDPOINT, HuggingFaceClient};
pub use ollama::{OLLAMA_ENDPOINT, OllamaClient};
pub use openai::{MISTRAL_ENDPOINT, OPENAI_ENDPOINT, OpenAIClient};
