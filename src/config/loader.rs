use super::CONFIG_PATH;
use super::catalog::{Catalog, RawPrompt, RawResource, RawTool, RawWorkflow};
use super::chat::RawChat;
use super::error::ConfigError;
use super::server::{RawAgent, RawArdf, RawServer, RawTaskRunner};
use crate::application::planner::PlannerVocabulary;
use crate::constants::ENV_PATH;
use crate::domain::Descriptor;
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub server: RawServer,
    #[serde(default)]
    pub ardf: RawArdf,
    pub task_runner: Option<RawTaskRunner>,
    #[serde(default)]
    pub agent: RawAgent,
    pub chat: Option<RawChat>,
    #[serde(default)]
    pub planner: RawPlanner,
    #[serde(default)]
    pub tools: Vec<RawTool>,
    #[serde(default)]
    pub prompts: Vec<RawPrompt>,
    #[serde(default)]
    pub resources: Vec<RawResource>,
    #[serde(default)]
    pub workflows: Vec<RawWorkflow>,
    #[serde(default)]
    pub descriptors: Vec<Descriptor>,
}

/// `[planner]` overrides; absent lists keep the built-in vocabulary.
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawPlanner {
    workflow_triggers: Option<Vec<String>>,
    descriptor_keywords: Option<Vec<String>>,
    goal_keywords: Option<Vec<String>>,
    default_prompt: Option<String>,
}

impl From<RawPlanner> for PlannerVocabulary {
    fn from(raw: RawPlanner) -> Self {
        let defaults = PlannerVocabulary::default();
        let lowered = |words: Vec<String>| -> Vec<String> {
            words
                .into_iter()
                .map(|word| word.trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect()
        };
        Self {
            workflow_triggers: raw
                .workflow_triggers
                .map(lowered)
                .unwrap_or(defaults.workflow_triggers),
            descriptor_keywords: raw
                .descriptor_keywords
                .map(lowered)
                .unwrap_or(defaults.descriptor_keywords),
            goal_keywords: raw.goal_keywords.map(lowered).unwrap_or(defaults.goal_keywords),
            default_prompt: raw
                .default_prompt
                .filter(|id| !id.trim().is_empty())
                .unwrap_or(defaults.default_prompt),
        }
    }
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Load and validate configuration from a file path
pub fn load_config(path: Option<&Path>) -> Result<super::AppConfig, ConfigError> {
    ensure_env_loaded();
    let config_path = path.unwrap_or_else(|| Path::new(CONFIG_PATH));
    read_config(config_path)
}

fn read_config(path: &Path) -> Result<super::AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading ARDF configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, path: &Path) -> Result<super::AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<super::AppConfig, ConfigError> {
    let server = parsed.server.into_settings()?;
    let ardf = parsed.ardf.into_settings()?;
    let task_runner = parsed
        .task_runner
        .map(RawTaskRunner::into_config)
        .transpose()?;
    let chat = parsed.chat.map(RawChat::into_config).transpose()?;

    let catalog = Catalog {
        tools: parsed
            .tools
            .into_iter()
            .map(RawTool::into_config)
            .collect::<Result<_, _>>()?,
        prompts: parsed
            .prompts
            .into_iter()
            .map(RawPrompt::into_config)
            .collect::<Result<_, _>>()?,
        resources: parsed
            .resources
            .into_iter()
            .map(RawResource::into_config)
            .collect::<Result<_, _>>()?,
        workflows: parsed
            .workflows
            .into_iter()
            .map(RawWorkflow::into_config)
            .collect::<Result<_, _>>()?,
        descriptors: parsed.descriptors,
    };

    debug!(
        tools = catalog.tools.len(),
        prompts = catalog.prompts.len(),
        resources = catalog.resources.len(),
        workflows = catalog.workflows.len(),
        descriptors = catalog.descriptors.len(),
        "Configuration catalog validated"
    );

    Ok(super::AppConfig {
        server,
        ardf,
        task_runner,
        agent: parsed.agent.into(),
        chat,
        planner: parsed.planner.into(),
        catalog,
    })
}
