//! Protocol clients used by the agent side.
//!
//! [`ProtocolClient`] is a single raw `request(method, params)` call; the
//! typed helpers on top of it decode the wire shapes from
//! [`crate::application::protocol`]. Two transports implement it:
//! [`LocalProtocolClient`] talks to an in-process router and
//! [`HttpProtocolClient`] speaks JSON-RPC over HTTP.

mod error;
mod http;
mod local;

pub use error::ClientError;
pub use http::HttpProtocolClient;
pub use local::LocalProtocolClient;

use crate::application::protocol::{
    ARDF_LIST, ArdfListing, CallToolResult, GetPromptResult, NamedCallParams, PROMPTS_GET,
    PROMPTS_LIST, PromptsListResult, RESOURCES_LIST, RESOURCES_READ, ReadResourceParams,
    ReadResourceResult, RenderedPrompt, ResourcesListResult, TOOLS_CALL, TOOLS_LIST,
    ToolsListResult,
};
use crate::application::registry::DescriptorFilter;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

#[async_trait]
pub trait ProtocolClient: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError>;

    async fn list_tools(&self) -> Result<ToolsListResult, ClientError> {
        let raw = self.request(TOOLS_LIST, json!({})).await?;
        decode(TOOLS_LIST, raw)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ClientError> {
        let params = encode(TOOLS_CALL, &named(name, arguments))?;
        let raw = self.request(TOOLS_CALL, params).await?;
        decode(TOOLS_CALL, raw)
    }

    async fn list_prompts(&self) -> Result<PromptsListResult, ClientError> {
        let raw = self.request(PROMPTS_LIST, json!({})).await?;
        decode(PROMPTS_LIST, raw)
    }

    async fn get_prompt(&self, name: &str, arguments: Value) -> Result<RenderedPrompt, ClientError> {
        let params = encode(PROMPTS_GET, &named(name, arguments))?;
        let raw = self.request(PROMPTS_GET, params).await?;
        decode::<GetPromptResult>(PROMPTS_GET, raw).map(|result| result.prompt)
    }

    async fn list_resources(&self) -> Result<ResourcesListResult, ClientError> {
        let raw = self.request(RESOURCES_LIST, json!({})).await?;
        decode(RESOURCES_LIST, raw)
    }

    async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ClientError> {
        self.read_resource_page(ReadResourceParams::uri(uri)).await
    }

    /// `resources/read` with filter criteria and a paging cursor, used for
    /// the ARDF index.
    async fn read_resource_page(
        &self,
        params: ReadResourceParams,
    ) -> Result<ReadResourceResult, ClientError> {
        let params = encode(RESOURCES_READ, &params)?;
        let raw = self.request(RESOURCES_READ, params).await?;
        decode(RESOURCES_READ, raw)
    }

    async fn ardf_list(&self, criteria: &DescriptorFilter) -> Result<ArdfListing, ClientError> {
        let params = encode(ARDF_LIST, criteria)?;
        let raw = self.request(ARDF_LIST, params).await?;
        decode(ARDF_LIST, raw)
    }
}

fn named(name: &str, arguments: Value) -> NamedCallParams {
    NamedCallParams {
        name: name.to_string(),
        arguments,
    }
}

fn encode<T: Serialize + ?Sized>(method: &str, params: &T) -> Result<Value, ClientError> {
    serde_json::to_value(params).map_err(|err| ClientError::decode(method, err.to_string()))
}

fn decode<T: DeserializeOwned>(method: &str, raw: Value) -> Result<T, ClientError> {
    serde_json::from_value(raw).map_err(|err| ClientError::decode(method, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::DescriptorRegistry;
    use crate::application::router::{ProtocolRouter, RouterError, RouterSettings};
    use crate::config::{ArdfAnnotations, Catalog, ResponseType, ToolConfig};
    use crate::domain::ResourceType;
    use std::sync::Arc;

    fn client() -> LocalProtocolClient {
        let catalog = Catalog {
            tools: vec![ToolConfig {
                name: "echo".into(),
                description: Some("Echoes its input".into()),
                input_schema: None,
                response_template: "{{text}}".into(),
                response_type: ResponseType::Text,
                delegate: None,
                ardf: ArdfAnnotations {
                    domain: Some("demo".into()),
                    ..ArdfAnnotations::default()
                },
            }],
            ..Catalog::default()
        };
        let registry = DescriptorRegistry::new(catalog).expect("registry builds");
        LocalProtocolClient::new(Arc::new(ProtocolRouter::new(
            Arc::new(registry),
            RouterSettings::default(),
        )))
    }

    #[tokio::test]
    async fn typed_helpers_decode_router_answers() {
        let client = client();
        let tools = client.list_tools().await.expect("tools listed");
        assert_eq!(tools.tools[0].name, "echo");

        let result = client
            .call_tool("echo", json!({"text": "ping"}))
            .await
            .expect("tool runs");
        assert_eq!(result.content[0].as_text(), Some("ping"));

        let listing = client
            .ardf_list(&DescriptorFilter::by_type(ResourceType::Tool).with_domain("demo"))
            .await
            .expect("index listed");
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn router_failures_surface_unchanged() {
        let err = client()
            .call_tool("ghost", Value::Null)
            .await
            .expect_err("unknown tool");
        assert!(matches!(
            err,
            ClientError::Router(RouterError::NotFound { name, .. }) if name == "ghost"
        ));
    }
}
