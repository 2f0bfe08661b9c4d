//! Tools that expose prompts, resources and the index through `tools/call`,
//! for clients that only speak tools. Enabled by `[server] builtin_tools`.

use super::{CapabilityKind, ProtocolRouter, RouterError};
use crate::application::protocol::{
    CallToolResult, ContentBlock, ReadResourceParams, ToolListing,
};
use crate::application::registry::DescriptorFilter;
use crate::constants::ARDF_INDEX_URI;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltinTool {
    ArdfList,
    PromptRun,
    ResourceRead,
}

impl BuiltinTool {
    pub(crate) const ALL: [BuiltinTool; 3] = [
        BuiltinTool::ArdfList,
        BuiltinTool::PromptRun,
        BuiltinTool::ResourceRead,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            BuiltinTool::ArdfList => "ardf.list",
            BuiltinTool::PromptRun => "prompt.run",
            BuiltinTool::ResourceRead => "resource.read",
        }
    }

    pub(crate) fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub(crate) fn listing(self) -> ToolListing {
        let (description, input_schema) = match self {
            BuiltinTool::ArdfList => (
                "List ARDF descriptors, optionally filtered by type, domain and tags",
                json!({
                    "type": "object",
                    "properties": {
                        "type": {"type": "string"},
                        "domain": {"type": "string"},
                        "tags": {"type": "array", "items": {"type": "string"}}
                    }
                }),
            ),
            BuiltinTool::PromptRun => (
                "Render a prompt with the given variables",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "vars": {"type": "object"}
                    },
                    "required": ["name"]
                }),
            ),
            BuiltinTool::ResourceRead => (
                "Read a resource by name or uri",
                json!({
                    "type": "object",
                    "properties": {"id": {"type": "string"}},
                    "required": ["id"]
                }),
            ),
        };
        ToolListing {
            name: self.name().to_string(),
            description: Some(description.to_string()),
            input_schema,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PromptRunArgs {
    name: String,
    #[serde(default)]
    vars: Value,
}

#[derive(Debug, Deserialize)]
struct ResourceReadArgs {
    #[serde(alias = "uri")]
    id: String,
}

impl ProtocolRouter {
    pub(crate) fn builtin(&self, name: &str) -> Option<BuiltinTool> {
        BuiltinTool::parse(name).filter(|tool| self.builtin_available(*tool))
    }

    pub(crate) fn builtin_available(&self, tool: BuiltinTool) -> bool {
        self.settings.builtin_tools
            && (tool != BuiltinTool::ArdfList || self.settings.ardf_enabled)
    }

    pub(crate) async fn call_builtin(
        &self,
        tool: BuiltinTool,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, RouterError> {
        let target = tool.name();
        let arguments = Value::Object(arguments);
        let output = match tool {
            BuiltinTool::ArdfList => {
                let criteria: DescriptorFilter = parse_args(target, arguments)?;
                to_json(target, &self.ardf_list(&criteria))?
            }
            BuiltinTool::PromptRun => {
                let args: PromptRunArgs = parse_args(target, arguments)?;
                let rendered = self.get_prompt(&args.name, args.vars).await?.prompt;
                let messages: Vec<Value> = rendered
                    .messages
                    .iter()
                    .map(|message| {
                        json!({
                            "role": message.role.as_str(),
                            "content": message.content.to_text(),
                        })
                    })
                    .collect();
                json!({ "name": rendered.name, "messages": messages })
            }
            BuiltinTool::ResourceRead => {
                let args: ResourceReadArgs = parse_args(target, arguments)?;
                let uri = self.resolve_resource_uri(&args.id)?;
                let result = self.read_resource(ReadResourceParams::uri(uri)).await?;
                to_json(target, &result)?
            }
        };
        Ok(CallToolResult {
            content: vec![ContentBlock::json(output)],
        })
    }

    fn resolve_resource_uri(&self, id: &str) -> Result<String, RouterError> {
        if let Some(resource) = self.registry.resource(id) {
            return Ok(resource.uri.clone());
        }
        if self.settings.ardf_enabled && id == ARDF_INDEX_URI {
            return Ok(id.to_string());
        }
        Err(RouterError::not_found(CapabilityKind::Resource, id))
    }
}

fn parse_args<T: DeserializeOwned>(target: &str, arguments: Value) -> Result<T, RouterError> {
    serde_json::from_value(arguments)
        .map_err(|err| RouterError::invalid_argument(target, err.to_string()))
}

fn to_json<T: Serialize>(target: &str, value: &T) -> Result<Value, RouterError> {
    serde_json::to_value(value)
        .map_err(|err| RouterError::invalid_response(target, err.to_string()))
}
