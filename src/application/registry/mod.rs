//! # Descriptor Registry
//!
//! Owns the configured capabilities and turns them into ARDF descriptors.
//! The registry is built once from configuration and never mutated; share it
//! behind an `Arc`.
//!
//! Index order is deterministic: tools, prompts, resources, workflows and
//! finally raw `[[descriptors]]`, each in configuration order.

mod error;
mod filter;

pub use error::RegistryError;
pub use filter::{DescriptorFilter, filter};

use crate::config::{
    AppConfig, Catalog, PromptConfig, ResourceConfig, ToolConfig, WorkflowConfig,
};
use crate::constants::ARDF_INDEX_URI;
use crate::domain::{Descriptor, DescriptorContent, Index, ResourceType};
use serde_json::json;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DescriptorRegistry {
    catalog: Catalog,
    descriptors: Vec<Descriptor>,
}

impl DescriptorRegistry {
    pub fn new(catalog: Catalog) -> Result<Self, RegistryError> {
        let mut uris = HashSet::new();
        for resource in &catalog.resources {
            if resource.uri == ARDF_INDEX_URI {
                return Err(RegistryError::ReservedUri {
                    name: resource.name.clone(),
                    uri: resource.uri.clone(),
                });
            }
            if !uris.insert(resource.uri.as_str()) {
                return Err(RegistryError::DuplicateUri {
                    uri: resource.uri.clone(),
                });
            }
        }

        let descriptors: Vec<Descriptor> = catalog
            .tools
            .iter()
            .map(tool_descriptor)
            .chain(catalog.prompts.iter().map(prompt_descriptor))
            .chain(catalog.resources.iter().map(resource_descriptor))
            .chain(catalog.workflows.iter().map(workflow_descriptor))
            .chain(catalog.descriptors.iter().cloned())
            .collect();

        let mut ids = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if descriptor.resource_id.trim().is_empty() {
                return Err(RegistryError::EmptyResourceId {
                    resource_type: descriptor.resource_type,
                });
            }
            if !ids.insert(descriptor.resource_id.as_str()) {
                return Err(RegistryError::DuplicateResourceId {
                    resource_id: descriptor.resource_id.clone(),
                });
            }
        }

        debug!(descriptors = descriptors.len(), "Descriptor registry built");
        Ok(Self {
            catalog,
            descriptors,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RegistryError> {
        Self::new(config.catalog.clone())
    }

    /// Every configured descriptor in registry order.
    pub fn build_index(&self) -> Index {
        Index::new(self.descriptors.clone())
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn tools(&self) -> &[ToolConfig] {
        &self.catalog.tools
    }

    pub fn prompts(&self) -> &[PromptConfig] {
        &self.catalog.prompts
    }

    pub fn resources(&self) -> &[ResourceConfig] {
        &self.catalog.resources
    }

    pub fn workflows(&self) -> &[WorkflowConfig] {
        &self.catalog.workflows
    }

    pub fn tool(&self, name: &str) -> Option<&ToolConfig> {
        self.catalog.tools.iter().find(|tool| tool.name == name)
    }

    pub fn prompt(&self, name: &str) -> Option<&PromptConfig> {
        self.catalog.prompts.iter().find(|prompt| prompt.name == name)
    }

    pub fn resource_by_uri(&self, uri: &str) -> Option<&ResourceConfig> {
        self.catalog
            .resources
            .iter()
            .find(|resource| resource.uri == uri)
    }

    /// Resolves a resource by its name first, then by its uri.
    pub fn resource(&self, id: &str) -> Option<&ResourceConfig> {
        self.catalog
            .resources
            .iter()
            .find(|resource| resource.name == id)
            .or_else(|| self.resource_by_uri(id))
    }
}

fn tool_descriptor(tool: &ToolConfig) -> Descriptor {
    let mut descriptor =
        Descriptor::new(&tool.name, ResourceType::Tool).with_description(tool.description.clone());
    if let Some(schema) = &tool.input_schema {
        descriptor = descriptor.with_content(DescriptorContent::new(
            "tool/input-schema",
            schema.clone(),
        ));
    }
    tool.ardf.apply(descriptor)
}

fn prompt_descriptor(prompt: &PromptConfig) -> Descriptor {
    let descriptor = Descriptor::new(&prompt.name, ResourceType::Prompt)
        .with_description(prompt.description.clone());
    let descriptor = if prompt.variables.is_empty() {
        descriptor
    } else {
        descriptor.with_content(DescriptorContent::new(
            "prompt/variables",
            json!({ "variables": prompt.variables }),
        ))
    };
    prompt.ardf.apply(descriptor)
}

fn resource_descriptor(resource: &ResourceConfig) -> Descriptor {
    let descriptor = Descriptor::new(&resource.name, resource.kind)
        .with_description(resource.description.clone())
        .with_content(DescriptorContent::resource_ref(&resource.uri));
    resource.ardf.apply(descriptor)
}

fn workflow_descriptor(workflow: &WorkflowConfig) -> Descriptor {
    let descriptor = Descriptor::new(&workflow.id, ResourceType::Workflow)
        .with_description(workflow.description.clone())
        .with_content(DescriptorContent::workflow_steps(&workflow.steps));
    workflow.ardf.apply(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArdfAnnotations, ResponseType};
    use crate::domain::WorkflowStep;

    fn tool(name: &str) -> ToolConfig {
        ToolConfig {
            name: name.into(),
            description: Some(format!("{name} tool")),
            input_schema: None,
            response_template: String::new(),
            response_type: ResponseType::Text,
            delegate: None,
            ardf: ArdfAnnotations::default(),
        }
    }

    fn resource(name: &str, uri: &str, kind: ResourceType) -> ResourceConfig {
        ResourceConfig {
            name: name.into(),
            description: None,
            uri: uri.into(),
            mime_type: Some("text/plain".into()),
            content: "body".into(),
            response_type: ResponseType::Text,
            kind,
            delegate: None,
            ardf: ArdfAnnotations::default(),
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            tools: vec![tool("b_tool"), tool("a_tool")],
            prompts: vec![PromptConfig {
                name: "notify".into(),
                description: None,
                variables: Vec::new(),
                messages: Vec::new(),
                delegate: None,
                ardf: ArdfAnnotations::default(),
            }],
            resources: vec![resource(
                "policy_privacy_v1",
                "policy://privacy",
                ResourceType::Policy,
            )],
            workflows: vec![WorkflowConfig {
                id: "flow".into(),
                description: None,
                steps: vec![WorkflowStep::tool("first", "b_tool")],
                ardf: ArdfAnnotations {
                    tags: vec!["workflow".into()],
                    ..ArdfAnnotations::default()
                },
            }],
            descriptors: vec![Descriptor::new("triage_model", ResourceType::Model)],
        }
    }

    #[test]
    fn index_follows_configuration_order() {
        let registry = DescriptorRegistry::new(catalog()).expect("registry builds");
        let index = registry.build_index();
        let ids: Vec<&str> = index.items.iter().map(|d| d.resource_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["b_tool", "a_tool", "notify", "policy_privacy_v1", "flow", "triage_model"]
        );
        assert_eq!(index, registry.build_index());
    }

    #[test]
    fn resources_keep_their_kind_and_uri() {
        let registry = DescriptorRegistry::new(catalog()).expect("registry builds");
        let index = registry.build_index();
        let policy = index.find("policy_privacy_v1").expect("policy listed");
        assert_eq!(policy.resource_type, ResourceType::Policy);
        assert_eq!(
            policy.content.as_ref().and_then(DescriptorContent::uri),
            Some("policy://privacy")
        );
        let flow = index.find("flow").expect("workflow listed");
        assert_eq!(
            flow.workflow_steps(),
            Some(vec![WorkflowStep::tool("first", "b_tool")])
        );
    }

    #[test]
    fn duplicate_ids_across_sections_are_rejected() {
        let mut catalog = catalog();
        catalog.prompts[0].name = "a_tool".into();
        let err = DescriptorRegistry::new(catalog).expect_err("duplicate rejected");
        assert!(matches!(
            err,
            RegistryError::DuplicateResourceId { resource_id } if resource_id == "a_tool"
        ));
    }

    #[test]
    fn index_uri_is_reserved() {
        let mut catalog = catalog();
        catalog
            .resources
            .push(resource("shadow", ARDF_INDEX_URI, ResourceType::Resource));
        assert!(matches!(
            DescriptorRegistry::new(catalog),
            Err(RegistryError::ReservedUri { .. })
        ));
    }

    #[test]
    fn duplicate_uris_are_rejected() {
        let mut catalog = catalog();
        catalog.resources.push(resource(
            "privacy_copy",
            "policy://privacy",
            ResourceType::Document,
        ));
        assert!(matches!(
            DescriptorRegistry::new(catalog),
            Err(RegistryError::DuplicateUri { uri }) if uri == "policy://privacy"
        ));
    }

    #[test]
    fn resources_resolve_by_name_or_uri() {
        let registry = DescriptorRegistry::new(catalog()).expect("registry builds");
        assert!(registry.resource("policy_privacy_v1").is_some());
        assert!(registry.resource("policy://privacy").is_some());
        assert!(registry.resource_by_uri("policy_privacy_v1").is_none());
        assert!(registry.tool("missing").is_none());
    }
}
