use serde::{Deserialize, Serialize};

/// One step of a workflow. A step names at most one target; a tool wins
/// when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
}

/// What a workflow step resolves to when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTarget<'a> {
    Tool(&'a str),
    Prompt(&'a str),
}

impl WorkflowStep {
    pub fn tool(step: impl Into<String>, tool_id: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            tool_id: Some(tool_id.into()),
            prompt_id: None,
        }
    }

    pub fn prompt(step: impl Into<String>, prompt_id: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            tool_id: None,
            prompt_id: Some(prompt_id.into()),
        }
    }

    pub fn target(&self) -> Option<StepTarget<'_>> {
        fn present(value: &Option<String>) -> Option<&str> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
        }
        present(&self.tool_id)
            .map(StepTarget::Tool)
            .or_else(|| present(&self.prompt_id).map(StepTarget::Prompt))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlanItem {
    Workflow { id: String, steps: Vec<WorkflowStep> },
    Tool { id: String },
    Prompt { id: String },
}

impl PlanItem {
    pub fn id(&self) -> &str {
        match self {
            PlanItem::Workflow { id, .. } | PlanItem::Tool { id } | PlanItem::Prompt { id } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlanItem::Workflow { .. } => "workflow",
            PlanItem::Tool { .. } => "tool",
            PlanItem::Prompt { .. } => "prompt",
        }
    }
}

pub type Plan = Vec<PlanItem>;
