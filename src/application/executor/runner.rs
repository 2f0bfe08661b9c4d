use super::discovery::discover;
use super::errors::{ExecutorError, StepError};
use super::heuristics::{ToolArguments, infer_tool_arguments};
use super::models::{ExecutorOptions, RunEntry, RunReport, StepFailurePolicy, StepKind};
use crate::application::client::ProtocolClient;
use crate::application::planner::GoalPlanner;
use crate::application::template;
use crate::domain::{ChatMessage, Descriptor, MessageRole, PlanItem, ResourceType, StepTarget};
use crate::infrastructure::model::ChatBackend;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const POLICY_PREFIX: &str = "POLICY:\n";

/// Drives a compiled plan against a protocol server, one step at a time.
pub struct PlanExecutor {
    client: Arc<dyn ProtocolClient>,
    chat: Arc<dyn ChatBackend>,
    planner: GoalPlanner,
    options: ExecutorOptions,
}

/// Everything a step needs besides its target.
struct StepContext<'a> {
    goal: &'a str,
    arguments: ToolArguments,
    policy: String,
}

impl PlanExecutor {
    pub fn new(
        client: Arc<dyn ProtocolClient>,
        chat: Arc<dyn ChatBackend>,
        planner: GoalPlanner,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            client,
            chat,
            planner,
            options,
        }
    }

    pub async fn run(&self, goal: &str) -> Result<RunReport, ExecutorError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(ExecutorError::EmptyGoal);
        }
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = run_id.as_str(), "Plan execution started");

        let discovery = discover(self.client.as_ref(), self.options.use_ardf).await;
        let plan = self.planner.plan(goal, &discovery.items);
        debug!(
            run_id = run_id.as_str(),
            source = ?discovery.source,
            descriptors = discovery.items.len(),
            steps = plan.len(),
            "Plan compiled"
        );

        let context = StepContext {
            goal,
            arguments: infer_tool_arguments(goal),
            policy: self.discover_policy(&discovery.items).await,
        };

        let mut entries = Vec::new();
        let mut halted = false;
        'plan: for item in &plan {
            match item {
                PlanItem::Workflow { id, steps } => {
                    for step in steps {
                        let Some(target) = step.target() else {
                            warn!(
                                workflow = id.as_str(),
                                step = step.step.as_str(),
                                "Workflow step has no target; skipping"
                            );
                            continue;
                        };
                        let mut entry = self.execute(target, &context).await;
                        entry.workflow = Some(id.clone());
                        entry.step = Some(step.step.clone());
                        if self.record(&mut entries, entry) {
                            halted = true;
                            break 'plan;
                        }
                    }
                }
                PlanItem::Tool { id } => {
                    let entry = self.execute(StepTarget::Tool(id), &context).await;
                    if self.record(&mut entries, entry) {
                        halted = true;
                        break 'plan;
                    }
                }
                PlanItem::Prompt { id } => {
                    let entry = self.execute(StepTarget::Prompt(id), &context).await;
                    if self.record(&mut entries, entry) {
                        halted = true;
                        break 'plan;
                    }
                }
            }
        }

        info!(
            run_id = run_id.as_str(),
            entries = entries.len(),
            halted,
            "Plan execution finished"
        );
        Ok(RunReport {
            run_id,
            goal: goal.to_string(),
            source: discovery.source,
            plan,
            policy_applied: !context.policy.trim().is_empty(),
            entries,
            halted,
        })
    }

    /// Appends `entry`; true when the run must stop.
    fn record(&self, entries: &mut Vec<RunEntry>, entry: RunEntry) -> bool {
        let stop =
            !entry.succeeded() && self.options.on_step_failure == StepFailurePolicy::Abort;
        if let Some(error) = &entry.error {
            warn!(
                kind = ?entry.kind,
                id = entry.id.as_str(),
                error = error.as_str(),
                "Plan step failed"
            );
        }
        entries.push(entry);
        stop
    }

    async fn execute(&self, target: StepTarget<'_>, context: &StepContext<'_>) -> RunEntry {
        let (kind, id, input, outcome) = match target {
            StepTarget::Tool(id) => {
                let input = context.arguments.to_value();
                let outcome = self.call_tool(id, input.clone()).await;
                (StepKind::Tool, id, input, outcome)
            }
            StepTarget::Prompt(id) => {
                let mut input = context.arguments.to_value();
                input["goal"] = Value::String(context.goal.to_string());
                let outcome = self.run_prompt(id, &input, &context.policy).await;
                (StepKind::Prompt, id, input, outcome)
            }
        };
        let (output, error) = match outcome {
            Ok(output) => (Some(output), None),
            Err(err) => (None, Some(err.to_string())),
        };
        RunEntry {
            kind,
            id: id.to_string(),
            workflow: None,
            step: None,
            input,
            output,
            error,
        }
    }

    async fn call_tool(&self, id: &str, arguments: Value) -> Result<Value, StepError> {
        debug!(tool = id, "Calling tool");
        let result = self.client.call_tool(id, arguments).await?;
        Ok(json!({ "content": result.content }))
    }

    async fn run_prompt(&self, id: &str, vars: &Value, policy: &str) -> Result<Value, StepError> {
        debug!(prompt = id, "Running prompt");
        let prompt = self.client.get_prompt(id, vars.clone()).await?;

        let mut messages: Vec<ChatMessage> = prompt
            .messages
            .iter()
            .map(|message| {
                let content = template::render(&message.content.to_text(), vars);
                ChatMessage::new(message.role, content)
            })
            .collect();
        if !policy.trim().is_empty() {
            messages.insert(
                0,
                ChatMessage::new(MessageRole::System, format!("{POLICY_PREFIX}{policy}")),
            );
        }

        let reply = self.chat.send(&messages).await?;
        Ok(json!({
            "provider": self.chat.provider(),
            "model": self.chat.model(),
            "messages": messages,
            "reply": reply,
        }))
    }

    /// Text of the first policy descriptor, or empty when there is none or
    /// it cannot be read.
    async fn discover_policy(&self, items: &[Descriptor]) -> String {
        let Some(policy) = items
            .iter()
            .find(|item| item.resource_type == ResourceType::Policy)
        else {
            return String::new();
        };
        let uri = policy
            .content
            .as_ref()
            .and_then(|content| content.uri())
            .unwrap_or(policy.resource_id.as_str());

        match self.client.read_resource(uri).await {
            Ok(result) => {
                let text = result.first_text().unwrap_or_default().to_string();
                debug!(
                    policy = policy.resource_id.as_str(),
                    chars = text.len(),
                    "Policy loaded"
                );
                text
            }
            Err(error) => {
                warn!(
                    policy = policy.resource_id.as_str(),
                    %error,
                    "Policy could not be read; continuing without it"
                );
                String::new()
            }
        }
    }
}
