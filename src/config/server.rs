use super::catalog::expand;
use super::error::ConfigError;
use crate::application::executor::StepFailurePolicy;
use crate::constants::{DEFAULT_BIND_ADDR, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// `[server]`: identity and transport of the JSON-RPC server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub name: String,
    pub version: String,
    pub bind: SocketAddr,
    pub cors_origins: Vec<String>,
    pub builtin_tools: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            bind: default_bind(),
            cors_origins: Vec::new(),
            builtin_tools: false,
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// `[ardf]`: index generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArdfSettings {
    pub enabled: bool,
    pub page_size: Option<usize>,
}

impl Default for ArdfSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: None,
        }
    }
}

/// `[task_runner]`: where delegated capabilities are executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRunnerConfig {
    pub endpoint: String,
    /// Name of the environment variable holding the bearer token.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// `[agent]`: how the plan executor reaches a server and reacts to failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub server_url: Option<String>,
    pub use_ardf: bool,
    pub on_step_failure: StepFailurePolicy,
    pub timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            use_ardf: true,
            on_step_failure: StepFailurePolicy::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct RawServer {
    name: Option<String>,
    version: Option<String>,
    bind: Option<String>,
    #[serde(default)]
    cors_origins: Vec<String>,
    #[serde(default)]
    builtin_tools: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct RawArdf {
    enabled: Option<bool>,
    page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawTaskRunner {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct RawAgent {
    server_url: Option<String>,
    use_ardf: Option<bool>,
    #[serde(default)]
    on_step_failure: StepFailurePolicy,
    timeout_secs: Option<u64>,
}

impl RawServer {
    pub(super) fn into_settings(self) -> Result<ServerSettings, ConfigError> {
        let defaults = ServerSettings::default();
        let bind_text = self.bind.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind = bind_text
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddress { value: bind_text })?;
        Ok(ServerSettings {
            name: self.name.unwrap_or(defaults.name),
            version: self.version.unwrap_or(defaults.version),
            bind,
            cors_origins: self.cors_origins,
            builtin_tools: self.builtin_tools,
        })
    }
}

impl RawArdf {
    pub(super) fn into_settings(self) -> Result<ArdfSettings, ConfigError> {
        if self.page_size == Some(0) {
            return Err(ConfigError::InvalidPageSize);
        }
        Ok(ArdfSettings {
            enabled: self.enabled.unwrap_or(true),
            page_size: self.page_size,
        })
    }
}

impl RawTaskRunner {
    pub(super) fn into_config(self) -> Result<TaskRunnerConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingField {
                section: "task_runner",
                field: "endpoint",
            })?;
        Ok(TaskRunnerConfig {
            endpoint: expand(&endpoint),
            api_key: self.api_key,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

impl From<RawAgent> for AgentSettings {
    fn from(raw: RawAgent) -> Self {
        Self {
            server_url: raw
                .server_url
                .filter(|url| !url.trim().is_empty())
                .map(|url| expand(&url)),
            use_ardf: raw.use_ardf.unwrap_or(true),
            on_step_failure: raw.on_step_failure,
            timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}
