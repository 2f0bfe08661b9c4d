pub mod app;
pub mod catalog;
pub mod chat;
pub mod error;
pub mod loader;
pub mod server;

pub use crate::constants::CONFIG_PATH;

pub use app::AppConfig;
pub use catalog::{
    ArdfAnnotations, Catalog, PromptConfig, PromptMessageConfig, PromptVariable, ResourceConfig,
    ResponseType, ToolConfig, WorkflowConfig,
};
pub use chat::ChatConfig;
pub use error::ConfigError;
pub use server::{AgentSettings, ArdfSettings, ServerSettings, TaskRunnerConfig};
