use crate::domain::{Descriptor, Index, ResourceType};
use serde::{Deserialize, Serialize};

/// Conjunctive descriptor filter. Absent criteria match everything; tags
/// must all be present on a descriptor for it to match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorFilter {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl DescriptorFilter {
    pub fn by_type(resource_type: ResourceType) -> Self {
        Self {
            resource_type: Some(resource_type),
            ..Self::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.resource_type.is_none() && self.domain.is_none() && self.tags.is_empty()
    }

    pub fn matches(&self, descriptor: &Descriptor) -> bool {
        if let Some(kind) = self.resource_type
            && descriptor.resource_type != kind
        {
            return false;
        }
        if let Some(domain) = &self.domain
            && descriptor.metadata.domain.as_deref() != Some(domain.as_str())
        {
            return false;
        }
        descriptor.metadata.has_all_tags(self.tags.as_slice())
    }
}

/// Keeps the descriptors of `index` that match, preserving order.
pub fn filter(index: &Index, criteria: &DescriptorFilter) -> Index {
    if criteria.is_empty() {
        return index.clone();
    }
    Index {
        items: index
            .items
            .iter()
            .filter(|item| criteria.matches(item))
            .cloned()
            .collect(),
        cursor: index.cursor.clone(),
    }
}
