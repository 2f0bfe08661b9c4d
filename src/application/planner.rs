//! # Goal Planner
//!
//! Compiles a free-text goal and an ARDF index into a [`Plan`]. Planning is
//! keyword driven, pure and deterministic:
//!
//! 1. The first workflow descriptor whose `when_to_use` mentions a trigger
//!    phrase, or that is tagged `workflow`, wins outright when it embeds its
//!    steps.
//! 2. Otherwise every tool and prompt whose text mentions a descriptor
//!    keyword is picked, or all of them when the goal mentions a goal
//!    keyword.
//! 3. With nothing picked, the plan is the default prompt alone.

use crate::domain::{Descriptor, Plan, PlanItem, ResourceType, WORKFLOW_STEPS_CONTENT};
use tracing::debug;

const WORKFLOW_TAG: &str = "workflow";

/// Words the planner looks for. Matching is case-insensitive; the values are
/// stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerVocabulary {
    pub workflow_triggers: Vec<String>,
    pub descriptor_keywords: Vec<String>,
    pub goal_keywords: Vec<String>,
    pub default_prompt: String,
}

impl Default for PlannerVocabulary {
    fn default() -> Self {
        Self {
            workflow_triggers: words(&["reservar", "book", "booking", "schedule"]),
            descriptor_keywords: words(&["paciente", "patient"]),
            goal_keywords: words(&["cita", "appointment"]),
            default_prompt: "notification_send".to_string(),
        }
    }
}

fn words(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn mentions_any(text: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| !needle.is_empty() && text.contains(needle.as_str()))
}

#[derive(Debug, Clone, Default)]
pub struct GoalPlanner {
    vocabulary: PlannerVocabulary,
}

impl GoalPlanner {
    pub fn new(vocabulary: PlannerVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &PlannerVocabulary {
        &self.vocabulary
    }

    pub fn plan(&self, goal: &str, items: &[Descriptor]) -> Plan {
        let goal = goal.to_lowercase();

        if let Some(workflow) = items.iter().find(|item| self.is_triggered_workflow(item))
            && let Some(content) = &workflow.content
            && content.content_type == WORKFLOW_STEPS_CONTENT
        {
            debug!(workflow = workflow.resource_id.as_str(), "Planning with workflow");
            return vec![PlanItem::Workflow {
                id: workflow.resource_id.clone(),
                steps: content.steps().unwrap_or_default(),
            }];
        }

        let goal_matches = mentions_any(&goal, &self.vocabulary.goal_keywords);
        let mut plan: Plan = Vec::new();
        for item in items {
            let blob = descriptor_blob(item);
            if blob.trim().is_empty() {
                continue;
            }
            if !goal_matches && !mentions_any(&blob, &self.vocabulary.descriptor_keywords) {
                continue;
            }
            match item.resource_type {
                ResourceType::Tool => plan.push(PlanItem::Tool {
                    id: item.resource_id.clone(),
                }),
                ResourceType::Prompt => plan.push(PlanItem::Prompt {
                    id: item.resource_id.clone(),
                }),
                _ => {}
            }
        }

        if plan.is_empty() {
            debug!(
                prompt = self.vocabulary.default_prompt.as_str(),
                "Nothing matched the goal; planning the default prompt"
            );
            plan.push(PlanItem::Prompt {
                id: self.vocabulary.default_prompt.clone(),
            });
        }
        plan
    }

    fn is_triggered_workflow(&self, item: &Descriptor) -> bool {
        if item.resource_type != ResourceType::Workflow {
            return false;
        }
        let when_to_use = item.when_to_use.as_deref().unwrap_or_default().to_lowercase();
        mentions_any(&when_to_use, &self.vocabulary.workflow_triggers)
            || item.metadata.has_tag(WORKFLOW_TAG)
    }
}

/// `when_to_use`, description and tags, space-joined and lowercased.
fn descriptor_blob(item: &Descriptor) -> String {
    let tags: Vec<&str> = item.metadata.tags.iter().map(String::as_str).collect();
    format!(
        "{} {} {}",
        item.when_to_use.as_deref().unwrap_or_default(),
        item.description.as_deref().unwrap_or_default(),
        tags.join(" ")
    )
    .to_lowercase()
}
