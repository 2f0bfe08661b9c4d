use crate::config::AgentSettings;
use crate::domain::Plan;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the executor does after a step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepFailurePolicy {
    /// Record the failure and run the next step.
    #[default]
    Continue,
    /// Record the failure and stop the run.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    pub use_ardf: bool,
    pub on_step_failure: StepFailurePolicy,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            use_ardf: true,
            on_step_failure: StepFailurePolicy::Continue,
        }
    }
}

impl ExecutorOptions {
    pub fn from_settings(settings: &AgentSettings) -> Self {
        Self {
            use_ardf: settings.use_ardf,
            on_step_failure: settings.on_step_failure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Tool,
    Prompt,
}

/// Where the descriptors the plan was built from came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSource {
    /// The `ardf://index` resource.
    Ardf,
    /// Per-kind listings.
    Fallback,
}

/// One executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub kind: StepKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunEntry {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub goal: String,
    pub source: IndexSource,
    pub plan: Plan,
    pub policy_applied: bool,
    pub entries: Vec<RunEntry>,
    pub halted: bool,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &RunEntry> {
        self.entries.iter().filter(|entry| !entry.succeeded())
    }
}
