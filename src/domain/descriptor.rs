//! ARDF descriptor model.
//!
//! A [`Descriptor`] is the uniform description of one capability (tool,
//! prompt, resource, workflow, policy, model or document). An [`Index`] is
//! the ordered list of descriptors a server exposes, optionally paged with
//! an opaque cursor.

use super::plan::WorkflowStep;
use crate::constants::{ARDF_MEDIA_TYPE, ARDF_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use thiserror::Error;

/// Content type carried by workflow descriptors that embed their steps.
pub const WORKFLOW_STEPS_CONTENT: &str = "workflow/steps";
/// Content type carried by resource and policy descriptors pointing at a readable uri.
pub const RESOURCE_REF_CONTENT: &str = "resource/ref";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Tool,
    Prompt,
    Resource,
    Workflow,
    Policy,
    Model,
    Document,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Tool,
        ResourceType::Prompt,
        ResourceType::Resource,
        ResourceType::Workflow,
        ResourceType::Policy,
        ResourceType::Model,
        ResourceType::Document,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Tool => "tool",
            ResourceType::Prompt => "prompt",
            ResourceType::Resource => "resource",
            ResourceType::Workflow => "workflow",
            ResourceType::Policy => "policy",
            ResourceType::Model => "model",
            ResourceType::Document => "document",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub data: Value,
}

impl DescriptorContent {
    pub fn new(content_type: impl Into<String>, data: Value) -> Self {
        Self {
            content_type: content_type.into(),
            data,
        }
    }

    pub fn workflow_steps(steps: &[WorkflowStep]) -> Self {
        Self::new(WORKFLOW_STEPS_CONTENT, json!({ "steps": steps }))
    }

    pub fn resource_ref(uri: &str) -> Self {
        Self::new(RESOURCE_REF_CONTENT, json!({ "uri": uri }))
    }

    /// Embedded steps, when this is well-formed `workflow/steps` content.
    pub fn steps(&self) -> Option<Vec<WorkflowStep>> {
        if self.content_type != WORKFLOW_STEPS_CONTENT {
            return None;
        }
        let steps = self.data.get("steps")?.clone();
        serde_json::from_value(steps).ok()
    }

    pub fn uri(&self) -> Option<&str> {
        self.data
            .get("uri")
            .and_then(Value::as_str)
            .filter(|uri| !uri.trim().is_empty())
    }
}

fn default_ardf_version() -> String {
    ARDF_VERSION.to_string()
}

fn default_media_type() -> String {
    ARDF_MEDIA_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Tag set. Ordering carries no meaning.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default = "default_ardf_version")]
    pub ardf_version: String,
    #[serde(rename = "mediaType", default = "default_media_type")]
    pub media_type: String,
}

impl Default for DescriptorMetadata {
    fn default() -> Self {
        Self {
            domain: None,
            tags: BTreeSet::new(),
            version: None,
            author: None,
            ardf_version: default_ardf_version(),
            media_type: default_media_type(),
        }
    }
}

impl DescriptorMetadata {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_all_tags<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().all(|tag| self.tags.contains(tag.as_ref()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub resource_id: String,
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_to_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<DescriptorContent>,
    #[serde(default)]
    pub metadata: DescriptorMetadata,
}

impl Descriptor {
    pub fn new(resource_id: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            resource_id: resource_id.into(),
            resource_type,
            description: None,
            when_to_use: None,
            content: None,
            metadata: DescriptorMetadata::default(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_when_to_use(mut self, when_to_use: Option<String>) -> Self {
        self.when_to_use = when_to_use;
        self
    }

    pub fn with_content(mut self, content: DescriptorContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.metadata.domain = domain;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.metadata.version = version;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.metadata.author = author;
        self
    }

    pub fn is_workflow(&self) -> bool {
        self.resource_type == ResourceType::Workflow
    }

    /// Steps embedded in a workflow descriptor.
    pub fn workflow_steps(&self) -> Option<Vec<WorkflowStep>> {
        if !self.is_workflow() {
            return None;
        }
        self.content.as_ref().and_then(DescriptorContent::steps)
    }
}

/// Ordered descriptors plus an optional cursor for the next page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    #[serde(default)]
    pub items: Vec<Descriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl Index {
    pub fn new(items: Vec<Descriptor>) -> Self {
        Self {
            items,
            cursor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parses and validates an index body received over the wire.
    pub fn parse(body: &str) -> Result<Self, IndexError> {
        let index: Index =
            serde_json::from_str(body).map_err(|source| IndexError::Malformed { source })?;
        index.validate()?;
        Ok(index)
    }

    pub fn from_value(value: Value) -> Result<Self, IndexError> {
        let index: Index =
            serde_json::from_value(value).map_err(|source| IndexError::Malformed { source })?;
        index.validate()?;
        Ok(index)
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for (position, item) in self.items.iter().enumerate() {
            if item.resource_id.trim().is_empty() {
                return Err(IndexError::EmptyResourceId { position });
            }
            if !seen.insert(item.resource_id.as_str()) {
                return Err(IndexError::DuplicateResourceId {
                    resource_id: item.resource_id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn find(&self, resource_id: &str) -> Option<&Descriptor> {
        self.items.iter().find(|item| item.resource_id == resource_id)
    }

    pub fn first_of_type(&self, resource_type: ResourceType) -> Option<&Descriptor> {
        self.items
            .iter()
            .find(|item| item.resource_type == resource_type)
    }
}

/// Every variant is a parse failure of an index body.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("ARDF index body is not well-formed: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },
    #[error("ARDF index item at position {position} has an empty resource_id")]
    EmptyResourceId { position: usize },
    #[error("ARDF index lists resource_id '{resource_id}' more than once")]
    DuplicateResourceId { resource_id: String },
}
