use super::{CapabilityKind, ProtocolRouter, RouterError, coerce_arguments};
use crate::application::protocol::{
    GetPromptResult, PromptListing, PromptMessage, PromptsListResult, RenderedPrompt,
};
use crate::application::template;
use crate::application::tooling::{DelegatedPayload, PromptOverrides};
use crate::config::{PromptConfig, PromptVariable};
use crate::domain::WorkflowReference;
use serde_json::{Map, Value, json};
use tracing::debug;

impl ProtocolRouter {
    pub fn list_prompts(&self) -> PromptsListResult {
        let prompts = self
            .registry
            .prompts()
            .iter()
            .map(|prompt| PromptListing {
                name: prompt.name.clone(),
                description: prompt.description.clone(),
                arguments: (!prompt.variables.is_empty()).then(|| prompt.variables.clone()),
            })
            .collect();
        PromptsListResult { prompts }
    }

    /// Renders the named prompt. Variable defaults are applied first; a
    /// required variable that is still missing or blank afterwards fails the
    /// call with [`RouterError::InvalidArgument`] naming the variable.
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<GetPromptResult, RouterError> {
        let prompt = self
            .registry
            .prompt(name)
            .ok_or_else(|| RouterError::not_found(CapabilityKind::Prompt, name))?;
        let mut arguments = coerce_arguments(name, arguments)?;
        apply_defaults(&mut arguments, &prompt.variables);

        let mut description = prompt.description.clone();
        let mut variables = prompt.variables.clone();
        let mut messages: Vec<PromptMessage> = prompt
            .messages
            .iter()
            .map(|message| PromptMessage::text(message.role, message.content.clone()))
            .collect();

        if let Some(reference) = &prompt.delegate {
            debug!(
                prompt = %prompt.name,
                workflow = reference.label(),
                "Delegating prompt generation"
            );
            let overrides = self.generate(prompt, reference, &arguments).await?;
            if overrides.description.is_some() {
                description = overrides.description;
            }
            if let Some(generated) = overrides.variables {
                variables = generated;
                apply_defaults(&mut arguments, &variables);
            }
            if let Some(generated) = overrides.messages {
                messages = generated;
            }
        }

        if let Some(missing) = variables
            .iter()
            .find(|variable| variable.required && !is_present(arguments.get(&variable.name)))
        {
            return Err(RouterError::invalid_argument(
                name,
                format!("missing required variable '{}'", missing.name),
            ));
        }

        let vars = Value::Object(arguments);
        let messages = messages
            .into_iter()
            .map(|message| {
                let rendered = template::render(&message.content.to_text(), &vars);
                PromptMessage::text(message.role, rendered)
            })
            .collect();

        Ok(GetPromptResult {
            prompt: RenderedPrompt {
                name: prompt.name.clone(),
                description,
                arguments: variables,
                messages,
            },
        })
    }

    async fn generate(
        &self,
        prompt: &PromptConfig,
        reference: &WorkflowReference,
        arguments: &Map<String, Value>,
    ) -> Result<PromptOverrides, RouterError> {
        let payload = json!({
            "name": prompt.name,
            "description": prompt.description,
            "variables": prompt.variables,
            "arguments": arguments,
        });
        let raw = self.delegate(&prompt.name, reference, payload).await?;
        PromptOverrides::from_payload(DelegatedPayload::new(raw))
            .map_err(|reason| RouterError::invalid_response(&prompt.name, reason))
    }
}

fn apply_defaults(arguments: &mut Map<String, Value>, variables: &[PromptVariable]) {
    for variable in variables {
        let Some(default) = &variable.default else {
            continue;
        };
        if !is_present(arguments.get(&variable.name)) {
            arguments.insert(variable.name.clone(), Value::String(default.clone()));
        }
    }
}

fn is_present(value: Option<&Value>) -> bool {
    value.is_some_and(|value| !value.is_null())
}
