use crate::domain::ResourceType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("resource_id '{resource_id}' is configured more than once")]
    DuplicateResourceId { resource_id: String },
    #[error("a {resource_type} descriptor is configured without a resource_id")]
    EmptyResourceId { resource_type: ResourceType },
    #[error("resource uri '{uri}' is configured more than once")]
    DuplicateUri { uri: String },
    #[error("resource '{name}' uses the reserved uri '{uri}'")]
    ReservedUri { name: String, uri: String },
}
