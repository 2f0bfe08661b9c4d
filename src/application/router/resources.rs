use super::{CapabilityKind, ProtocolRouter, RouterError, text_block};
use crate::application::protocol::{
    ReadResourceParams, ReadResourceResult, ResourceListing, ResourcesListResult,
};
use crate::application::tooling::{DelegatedPayload, ResourceOverrides};
use crate::config::ResourceConfig;
use crate::constants::{ARDF_INDEX_URI, ARDF_MEDIA_TYPE};
use crate::domain::WorkflowReference;
use serde_json::json;
use tracing::debug;

const INDEX_RESOURCE_NAME: &str = "ardf-index";

impl ProtocolRouter {
    pub fn list_resources(&self) -> ResourcesListResult {
        let mut resources: Vec<ResourceListing> = self
            .registry
            .resources()
            .iter()
            .map(|resource| ResourceListing {
                name: resource.name.clone(),
                description: resource.description.clone(),
                uri: resource.uri.clone(),
                mime_type: resource.mime_type.clone(),
            })
            .collect();

        if self.settings.ardf_enabled {
            resources.push(ResourceListing {
                name: INDEX_RESOURCE_NAME.to_string(),
                description: Some("ARDF index of every capability this server exposes".into()),
                uri: ARDF_INDEX_URI.to_string(),
                mime_type: Some(ARDF_MEDIA_TYPE.to_string()),
            });
        }
        ResourcesListResult { resources }
    }

    pub async fn read_resource(
        &self,
        params: ReadResourceParams,
    ) -> Result<ReadResourceResult, RouterError> {
        if self.settings.ardf_enabled && params.uri == ARDF_INDEX_URI {
            return self.read_index(&params.filter, params.cursor.as_deref());
        }

        let resource = self
            .registry
            .resource_by_uri(&params.uri)
            .ok_or_else(|| RouterError::not_found(CapabilityKind::Resource, &params.uri))?;

        match &resource.delegate {
            Some(reference) => self.load_delegated(resource, reference).await,
            None => Ok(ReadResourceResult {
                contents: vec![text_block(
                    &resource.uri,
                    resource.content.clone(),
                    resource.response_type,
                )?],
                mime_type: resource.mime_type.clone(),
                description: resource.description.clone(),
            }),
        }
    }

    async fn load_delegated(
        &self,
        resource: &ResourceConfig,
        reference: &WorkflowReference,
    ) -> Result<ReadResourceResult, RouterError> {
        debug!(uri = %resource.uri, workflow = reference.label(), "Delegating resource load");
        let payload = json!({
            "uri": resource.uri,
            "name": resource.name,
            "description": resource.description,
            "mime_type": resource.mime_type,
        });
        let raw = self.delegate(&resource.uri, reference, payload).await?;
        let overrides =
            ResourceOverrides::from_payload(DelegatedPayload::new(raw), resource.response_type)
                .map_err(|reason| RouterError::invalid_response(&resource.uri, reason))?;

        Ok(ReadResourceResult {
            contents: vec![overrides.block],
            mime_type: overrides.mime_type.or_else(|| resource.mime_type.clone()),
            description: overrides
                .description
                .or_else(|| resource.description.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::protocol::ContentBlock;
    use crate::application::registry::DescriptorRegistry;
    use crate::application::router::RouterSettings;
    use crate::application::tooling::{TaskRunner, TaskRunnerError};
    use crate::config::{ArdfAnnotations, Catalog, ResponseType};
    use crate::domain::ResourceType;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct EchoRunner;

    #[async_trait]
    impl TaskRunner for EchoRunner {
        async fn invoke(
            &self,
            _reference: &WorkflowReference,
            payload: Value,
        ) -> Result<Value, TaskRunnerError> {
            Ok(json!({
                "mimeType": "application/json",
                "data": {"uri": payload["uri"], "loaded": true}
            }))
        }
    }

    fn resource(name: &str, uri: &str, content: &str, response_type: ResponseType) -> ResourceConfig {
        ResourceConfig {
            name: name.into(),
            description: Some(format!("{name} resource")),
            uri: uri.into(),
            mime_type: Some("text/plain".into()),
            content: content.into(),
            response_type,
            kind: ResourceType::Resource,
            delegate: None,
            ardf: ArdfAnnotations::default(),
        }
    }

    fn router(ardf_enabled: bool) -> ProtocolRouter {
        let mut delegated = resource("live", "data://live", "", ResponseType::Json);
        delegated.delegate = Some(WorkflowReference::new(Some("loader".into()), None));
        let catalog = Catalog {
            resources: vec![
                resource("notes", "file://notes", "hello", ResponseType::Text),
                resource("broken", "file://broken", "not json", ResponseType::Json),
                delegated,
            ],
            ..Catalog::default()
        };
        let registry = DescriptorRegistry::new(catalog).expect("registry builds");
        ProtocolRouter::new(
            Arc::new(registry),
            RouterSettings {
                ardf_enabled,
                ..RouterSettings::default()
            },
        )
        .with_task_runner(Arc::new(EchoRunner))
    }

    #[test]
    fn index_resource_is_listed_only_when_enabled() {
        let listed = router(true).list_resources().resources;
        let last = listed.last().expect("index listed");
        assert_eq!(last.uri, ARDF_INDEX_URI);
        assert_eq!(last.mime_type.as_deref(), Some(ARDF_MEDIA_TYPE));
        assert_eq!(router(false).list_resources().resources.len(), 3);
    }

    #[tokio::test]
    async fn static_resources_return_their_content() {
        let result = router(true)
            .read_resource(ReadResourceParams::uri("file://notes"))
            .await
            .expect("resource reads");
        assert_eq!(result.first_text(), Some("hello"));
        assert_eq!(result.mime_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn unparsable_json_resources_fail() {
        let err = router(true)
            .read_resource(ReadResourceParams::uri("file://broken"))
            .await
            .expect_err("content is not JSON");
        assert!(matches!(err, RouterError::InvalidResponse { target, .. } if target == "file://broken"));
    }

    #[tokio::test]
    async fn delegated_loaders_override_mime_type() {
        let result = router(true)
            .read_resource(ReadResourceParams::uri("data://live"))
            .await
            .expect("loader runs");
        assert_eq!(result.mime_type.as_deref(), Some("application/json"));
        assert_eq!(
            result.contents,
            vec![ContentBlock::json(json!({"uri": "data://live", "loaded": true}))]
        );
        assert_eq!(result.description.as_deref(), Some("live resource"));
    }

    #[tokio::test]
    async fn index_uri_is_unknown_when_disabled() {
        let err = router(false)
            .read_resource(ReadResourceParams::uri(ARDF_INDEX_URI))
            .await
            .expect_err("index disabled");
        assert!(matches!(
            err,
            RouterError::NotFound { kind: CapabilityKind::Resource, .. }
        ));
    }
}
