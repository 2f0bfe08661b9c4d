//! Capability catalog: the `[[tools]]`, `[[prompts]]`, `[[resources]]`,
//! `[[workflows]]` and `[[descriptors]]` sections of the configuration.

use super::error::ConfigError;
use crate::domain::{
    Descriptor, MessageRole, ResourceType, WorkflowReference, WorkflowStep,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Text,
    Json,
}

/// ARDF metadata a capability advertises in the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArdfAnnotations {
    #[serde(default)]
    pub when_to_use: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl ArdfAnnotations {
    pub(crate) fn apply(&self, descriptor: Descriptor) -> Descriptor {
        descriptor
            .with_when_to_use(self.when_to_use.clone())
            .with_domain(self.domain.clone())
            .with_tags(self.tags.iter().cloned())
            .with_version(self.version.clone())
            .with_author(self.author.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
    pub response_template: String,
    pub response_type: ResponseType,
    pub delegate: Option<WorkflowReference>,
    pub ardf: ArdfAnnotations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVariable {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessageConfig {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptConfig {
    pub name: String,
    pub description: Option<String>,
    pub variables: Vec<PromptVariable>,
    pub messages: Vec<PromptMessageConfig>,
    pub delegate: Option<WorkflowReference>,
    pub ardf: ArdfAnnotations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfig {
    pub name: String,
    pub description: Option<String>,
    pub uri: String,
    pub mime_type: Option<String>,
    pub content: String,
    pub response_type: ResponseType,
    /// Descriptor kind in the index: resource, policy, document or model.
    pub kind: ResourceType,
    pub delegate: Option<WorkflowReference>,
    pub ardf: ArdfAnnotations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub id: String,
    pub description: Option<String>,
    pub steps: Vec<WorkflowStep>,
    pub ardf: ArdfAnnotations,
}

/// Every configured capability, in file order per section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub tools: Vec<ToolConfig>,
    pub prompts: Vec<PromptConfig>,
    pub resources: Vec<ResourceConfig>,
    pub workflows: Vec<WorkflowConfig>,
    pub descriptors: Vec<Descriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawTool {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_schema: Option<toml::Value>,
    #[serde(default)]
    response_template: Option<String>,
    #[serde(default)]
    response_type: ResponseType,
    #[serde(default)]
    delegate: Option<WorkflowReference>,
    #[serde(flatten)]
    ardf: ArdfAnnotations,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum RawPromptVariable {
    Name(String),
    Detailed(PromptVariable),
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawPromptMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawPrompt {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    variables: Vec<RawPromptVariable>,
    #[serde(default)]
    messages: Vec<RawPromptMessage>,
    #[serde(default)]
    delegate: Option<WorkflowReference>,
    #[serde(flatten)]
    ardf: ArdfAnnotations,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawResource {
    name: String,
    #[serde(default)]
    description: Option<String>,
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    response_type: ResponseType,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    delegate: Option<WorkflowReference>,
    #[serde(flatten)]
    ardf: ArdfAnnotations,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawWorkflow {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    steps: Vec<WorkflowStep>,
    #[serde(flatten)]
    ardf: ArdfAnnotations,
}

fn require_name(section: &'static str, name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::invalid_entry(section, name, "name must not be empty"));
    }
    Ok(())
}

fn check_delegate(
    section: &'static str,
    name: &str,
    delegate: Option<WorkflowReference>,
) -> Result<Option<WorkflowReference>, ConfigError> {
    match delegate {
        Some(reference) if !reference.is_valid() => Err(ConfigError::invalid_entry(
            section,
            name,
            "delegate needs an id or a name",
        )),
        other => Ok(other),
    }
}

impl RawTool {
    pub(super) fn into_config(self) -> Result<ToolConfig, ConfigError> {
        require_name("tools", &self.name)?;
        let input_schema = match self.input_schema {
            None => None,
            Some(toml::Value::String(text)) => {
                let parsed: Value = serde_json::from_str(&text).map_err(|err| {
                    ConfigError::invalid_entry(
                        "tools",
                        &self.name,
                        format!("input_schema is not valid JSON: {err}"),
                    )
                })?;
                Some(parsed)
            }
            Some(table) => Some(serde_json::to_value(table).map_err(|err| {
                ConfigError::invalid_entry("tools", &self.name, format!("input_schema: {err}"))
            })?),
        };
        if let Some(schema) = &input_schema
            && !schema.is_object()
        {
            return Err(ConfigError::invalid_entry(
                "tools",
                &self.name,
                "input_schema must describe an object",
            ));
        }
        let delegate = check_delegate("tools", &self.name, self.delegate)?;
        Ok(ToolConfig {
            name: self.name,
            description: self.description,
            input_schema,
            response_template: self.response_template.unwrap_or_default(),
            response_type: self.response_type,
            delegate,
            ardf: self.ardf,
        })
    }
}

impl From<RawPromptVariable> for PromptVariable {
    fn from(value: RawPromptVariable) -> Self {
        match value {
            RawPromptVariable::Name(name) => Self {
                name,
                description: None,
                required: false,
                default: None,
            },
            RawPromptVariable::Detailed(variable) => variable,
        }
    }
}

impl RawPrompt {
    pub(super) fn into_config(self) -> Result<PromptConfig, ConfigError> {
        require_name("prompts", &self.name)?;
        let mut messages = Vec::with_capacity(self.messages.len());
        for message in self.messages {
            let role = MessageRole::parse(&message.role).ok_or_else(|| {
                ConfigError::invalid_entry(
                    "prompts",
                    &self.name,
                    format!("unknown message role '{}'", message.role),
                )
            })?;
            messages.push(PromptMessageConfig {
                role,
                content: message.content,
            });
        }
        let variables: Vec<PromptVariable> =
            self.variables.into_iter().map(PromptVariable::from).collect();
        if let Some(blank) = variables.iter().find(|v| v.name.trim().is_empty()) {
            return Err(ConfigError::invalid_entry(
                "prompts",
                &self.name,
                format!("variable '{}' has an empty name", blank.name),
            ));
        }
        let delegate = check_delegate("prompts", &self.name, self.delegate)?;
        Ok(PromptConfig {
            name: self.name,
            description: self.description,
            variables,
            messages,
            delegate,
            ardf: self.ardf,
        })
    }
}

impl RawResource {
    pub(super) fn into_config(self) -> Result<ResourceConfig, ConfigError> {
        require_name("resources", &self.name)?;
        if self.uri.trim().is_empty() {
            return Err(ConfigError::invalid_entry(
                "resources",
                &self.name,
                "uri must not be empty",
            ));
        }
        let kind = match self.kind.as_deref() {
            None => ResourceType::Resource,
            Some(raw) => match ResourceType::parse(raw) {
                Some(
                    kind @ (ResourceType::Resource
                    | ResourceType::Policy
                    | ResourceType::Document
                    | ResourceType::Model),
                ) => kind,
                _ => {
                    return Err(ConfigError::invalid_entry(
                        "resources",
                        &self.name,
                        format!("kind '{raw}' must be resource, policy, document or model"),
                    ));
                }
            },
        };
        let delegate = check_delegate("resources", &self.name, self.delegate)?;
        Ok(ResourceConfig {
            name: self.name,
            description: self.description,
            uri: expand(&self.uri),
            mime_type: self.mime_type,
            content: self.content.unwrap_or_default(),
            response_type: self.response_type,
            kind,
            delegate,
            ardf: self.ardf,
        })
    }
}

impl RawWorkflow {
    pub(super) fn into_config(self) -> Result<WorkflowConfig, ConfigError> {
        require_name("workflows", &self.id)?;
        if let Some(step) = self.steps.iter().find(|step| step.target().is_none()) {
            return Err(ConfigError::invalid_entry(
                "workflows",
                &self.id,
                format!("step '{}' names neither tool_id nor prompt_id", step.step),
            ));
        }
        Ok(WorkflowConfig {
            id: self.id,
            description: self.description,
            steps: self.steps,
            ardf: self.ardf,
        })
    }
}

/// Expands `$VAR` and `~` the way the rest of the configuration does,
/// keeping the raw text when expansion fails.
pub(super) fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_tool(body: &str) -> RawTool {
        toml::from_str(body).expect("raw tool parses")
    }

    #[test]
    fn input_schema_accepts_inline_tables_and_json_strings() {
        let table = raw_tool(
            r#"
name = "lookup"
input_schema = { type = "object", properties = { patientId = { type = "string" } } }
"#,
        )
        .into_config()
        .expect("valid tool");
        let text = raw_tool(
            r#"
name = "lookup"
input_schema = '{"type":"object","properties":{"patientId":{"type":"string"}}}'
"#,
        )
        .into_config()
        .expect("valid tool");
        assert_eq!(table.input_schema, text.input_schema);
        assert_eq!(
            table.input_schema.as_ref().and_then(|s| s["type"].as_str()),
            Some("object")
        );
    }

    #[test]
    fn broken_json_schema_names_the_tool() {
        let err = raw_tool(
            r#"
name = "lookup"
input_schema = "{not json"
"#,
        )
        .into_config()
        .expect_err("schema rejected");
        assert!(err.to_string().contains("lookup"));
    }

    #[test]
    fn ardf_annotations_are_flattened_into_entries() {
        let tool = raw_tool(
            r#"
name = "patient_lookup"
when_to_use = "Cuando se requiera localizar un paciente"
domain = "healthcare"
tags = ["patient", "lookup"]
"#,
        )
        .into_config()
        .expect("valid tool");
        assert_eq!(tool.ardf.domain.as_deref(), Some("healthcare"));
        assert_eq!(tool.ardf.tags, vec!["patient", "lookup"]);
    }

    #[test]
    fn resource_kind_is_limited_to_readable_kinds() {
        let raw: RawResource = toml::from_str(
            r#"
name = "policy"
uri = "policy://privacy"
kind = "tool"
"#,
        )
        .expect("raw resource parses");
        assert!(matches!(
            raw.into_config(),
            Err(ConfigError::InvalidEntry { section: "resources", .. })
        ));
    }

    #[test]
    fn prompt_roles_are_validated() {
        let raw: RawPrompt = toml::from_str(
            r#"
name = "notify"
messages = [{ role = "narrator", content = "hi" }]
"#,
        )
        .expect("raw prompt parses");
        let err = raw.into_config().expect_err("role rejected");
        assert!(err.to_string().contains("narrator"));
    }

    #[test]
    fn delegate_without_target_is_rejected() {
        let err = raw_tool(
            r#"
name = "remote"
delegate = {}
"#,
        )
        .into_config()
        .expect_err("empty delegate rejected");
        assert!(err.to_string().contains("delegate"));
    }
}
