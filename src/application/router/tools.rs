use super::builtin::BuiltinTool;
use super::{CapabilityKind, ProtocolRouter, RouterError, coerce_arguments, text_block};
use crate::application::protocol::{
    CallToolResult, ContentBlock, ToolListing, ToolsListResult, default_input_schema,
};
use crate::application::template;
use crate::application::tooling::DelegatedPayload;
use crate::config::ToolConfig;
use serde_json::{Map, Value, json};
use tracing::debug;

impl ProtocolRouter {
    pub fn list_tools(&self) -> ToolsListResult {
        let mut tools: Vec<ToolListing> = self
            .registry
            .tools()
            .iter()
            .map(|tool| ToolListing {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool
                    .input_schema
                    .clone()
                    .unwrap_or_else(default_input_schema),
            })
            .collect();

        if self.settings.builtin_tools {
            tools.extend(
                BuiltinTool::ALL
                    .iter()
                    .filter(|builtin| self.builtin_available(**builtin))
                    .map(|builtin| builtin.listing()),
            );
        }
        ToolsListResult { tools }
    }

    /// Configured tools shadow built-ins of the same name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, RouterError> {
        if let Some(tool) = self.registry.tool(name) {
            let arguments = coerce_arguments(name, arguments)?;
            let block = match &tool.delegate {
                Some(reference) => {
                    debug!(tool = %tool.name, workflow = reference.label(), "Delegating tool call");
                    let payload = json!({
                        "tool": tool.name,
                        "description": tool.description,
                        "arguments": arguments,
                    });
                    let raw = self.delegate(&tool.name, reference, payload).await?;
                    DelegatedPayload::new(raw)
                        .into_block(tool.response_type)
                        .map_err(|reason| RouterError::invalid_response(&tool.name, reason))?
                }
                None => render_inline(tool, arguments)?,
            };
            return Ok(CallToolResult {
                content: vec![block],
            });
        }

        match self.builtin(name) {
            Some(builtin) => {
                let arguments = coerce_arguments(name, arguments)?;
                self.call_builtin(builtin, arguments).await
            }
            None => Err(RouterError::not_found(CapabilityKind::Tool, name)),
        }
    }
}

fn render_inline(
    tool: &ToolConfig,
    arguments: Map<String, Value>,
) -> Result<ContentBlock, RouterError> {
    let rendered = template::render(&tool.response_template, &Value::Object(arguments));
    text_block(&tool.name, rendered, tool.response_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::DescriptorRegistry;
    use crate::application::router::RouterSettings;
    use crate::config::{ArdfAnnotations, Catalog, ResponseType};
    use crate::domain::WorkflowReference;
    use std::sync::Arc;

    fn tool(name: &str, template: &str, response_type: ResponseType) -> ToolConfig {
        ToolConfig {
            name: name.into(),
            description: None,
            input_schema: None,
            response_template: template.into(),
            response_type,
            delegate: None,
            ardf: ArdfAnnotations::default(),
        }
    }

    fn router(builtin_tools: bool) -> ProtocolRouter {
        let catalog = Catalog {
            tools: vec![
                tool("greet", "Hola {{name}}", ResponseType::Text),
                tool("lookup", r#"{"id": "{{id}}"}"#, ResponseType::Json),
            ],
            ..Catalog::default()
        };
        let registry = DescriptorRegistry::new(catalog).expect("registry builds");
        ProtocolRouter::new(
            Arc::new(registry),
            RouterSettings {
                builtin_tools,
                ..RouterSettings::default()
            },
        )
    }

    #[tokio::test]
    async fn inline_templates_render_arguments() {
        let result = router(false)
            .call_tool("greet", json!({"name": "Ana"}))
            .await
            .expect("tool runs");
        assert_eq!(result.content, vec![ContentBlock::text("Hola Ana")]);

        let result = router(false)
            .call_tool("lookup", json!("{\"id\": 42}"))
            .await
            .expect("tool runs");
        assert_eq!(result.content, vec![ContentBlock::json(json!({"id": "42"}))]);
    }

    #[tokio::test]
    async fn unresolved_placeholders_stay_in_the_output() {
        let result = router(false)
            .call_tool("greet", Value::Null)
            .await
            .expect("tool runs");
        assert_eq!(result.content, vec![ContentBlock::text("Hola {{name}}")]);
    }

    #[tokio::test]
    async fn delegated_tools_need_a_runner() {
        let mut catalog = Catalog::default();
        let mut delegated = tool("book", "", ResponseType::Json);
        delegated.delegate = Some(WorkflowReference::new(Some("wf-1".into()), None));
        catalog.tools.push(delegated);
        let registry = DescriptorRegistry::new(catalog).expect("registry builds");
        let router = ProtocolRouter::new(Arc::new(registry), RouterSettings::default());

        let err = router
            .call_tool("book", json!({}))
            .await
            .expect_err("no runner configured");
        assert!(matches!(err, RouterError::DelegationUnavailable { target } if target == "book"));
    }

    #[test]
    fn builtins_are_listed_after_configured_tools() {
        let names: Vec<String> = router(true)
            .list_tools()
            .tools
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        assert_eq!(
            names,
            vec!["greet", "lookup", "ardf.list", "prompt.run", "resource.read"]
        );
        assert_eq!(router(false).list_tools().tools.len(), 2);
    }
}
