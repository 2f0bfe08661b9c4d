use super::catalog::Catalog;
use super::chat::ChatConfig;
use super::error::ConfigError;
use super::server::{AgentSettings, ArdfSettings, ServerSettings, TaskRunnerConfig};
use crate::application::planner::PlannerVocabulary;
use std::path::Path;

/// Application configuration loaded from ardf.toml
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub ardf: ArdfSettings,
    pub task_runner: Option<TaskRunnerConfig>,
    pub agent: AgentSettings,
    pub chat: Option<ChatConfig>,
    pub planner: PlannerVocabulary,
    pub catalog: Catalog,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse configuration from TOML text that did not come from a file.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, Path::new("<inline>"))
    }
}
