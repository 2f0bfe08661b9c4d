//! # Protocol Router
//!
//! Server-side dispatcher for the protocol method families. The router owns
//! a finite table from method name to handler, seeded at construction:
//!
//! | Method | Implemented in |
//! |--------|----------------|
//! | `tools/list`, `tools/call` | `tools.rs` |
//! | `prompts/list`, `prompts/get` | `prompts.rs` |
//! | `resources/list`, `resources/read` | `resources.rs` |
//! | `ardf.list` (only with ARDF enabled) | `index.rs` |
//!
//! Handlers decode their params, call the typed method on
//! [`ProtocolRouter`] and encode the result. A failing handler returns a
//! [`RouterError`] and never a partial result.

mod builtin;
mod error;
mod index;
mod prompts;
mod resources;
mod tools;

pub use error::{CapabilityKind, RouterError};

use crate::application::protocol::{
    ARDF_LIST, ContentBlock, NamedCallParams, PROMPTS_GET, PROMPTS_LIST, RESOURCES_LIST,
    RESOURCES_READ, ReadResourceParams, TOOLS_CALL, TOOLS_LIST,
};
use crate::application::registry::{DescriptorFilter, DescriptorRegistry};
use crate::application::tooling::TaskRunner;
use crate::config::{AppConfig, ResponseType};
use crate::domain::WorkflowReference;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

type Handler = for<'a> fn(&'a ProtocolRouter, Value) -> BoxFuture<'a, Result<Value, RouterError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterSettings {
    pub ardf_enabled: bool,
    pub page_size: Option<usize>,
    pub builtin_tools: bool,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            ardf_enabled: true,
            page_size: None,
            builtin_tools: false,
        }
    }
}

impl RouterSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ardf_enabled: config.ardf.enabled,
            page_size: config.ardf.page_size,
            builtin_tools: config.server.builtin_tools,
        }
    }
}

pub struct ProtocolRouter {
    registry: Arc<DescriptorRegistry>,
    runner: Option<Arc<dyn TaskRunner>>,
    settings: RouterSettings,
    handlers: HashMap<&'static str, Handler>,
}

impl ProtocolRouter {
    pub fn new(registry: Arc<DescriptorRegistry>, settings: RouterSettings) -> Self {
        Self {
            registry,
            runner: None,
            settings,
            handlers: method_table(settings.ardf_enabled),
        }
    }

    pub fn with_task_runner(mut self, runner: Arc<dyn TaskRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    pub fn settings(&self) -> RouterSettings {
        self.settings
    }

    /// Supported method names, sorted.
    pub fn methods(&self) -> Vec<&'static str> {
        let mut methods: Vec<&'static str> = self.handlers.keys().copied().collect();
        methods.sort_unstable();
        methods
    }

    pub fn supports(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RouterError> {
        let handler = self
            .handlers
            .get(method)
            .copied()
            .ok_or_else(|| RouterError::method_not_found(method))?;
        debug!(method, "Dispatching protocol request");
        let result = handler(self, params).await;
        if let Err(error) = &result {
            warn!(
                method,
                kind = error.kind(),
                target = error.target(),
                %error,
                "Protocol request failed"
            );
        }
        result
    }

    async fn delegate(
        &self,
        target: &str,
        reference: &WorkflowReference,
        payload: Value,
    ) -> Result<Value, RouterError> {
        let runner = self
            .runner
            .as_ref()
            .ok_or_else(|| RouterError::DelegationUnavailable {
                target: target.to_string(),
            })?;
        runner
            .invoke(reference, payload)
            .await
            .map_err(|source| RouterError::Delegation {
                target: target.to_string(),
                source,
            })
    }
}

fn method_table(ardf_enabled: bool) -> HashMap<&'static str, Handler> {
    let mut table: HashMap<&'static str, Handler> = HashMap::new();
    table.insert(TOOLS_LIST, handle_tools_list);
    table.insert(TOOLS_CALL, handle_tools_call);
    table.insert(PROMPTS_LIST, handle_prompts_list);
    table.insert(PROMPTS_GET, handle_prompts_get);
    table.insert(RESOURCES_LIST, handle_resources_list);
    table.insert(RESOURCES_READ, handle_resources_read);
    if ardf_enabled {
        table.insert(ARDF_LIST, handle_ardf_list);
    }
    table
}

fn handle_tools_list(
    router: &ProtocolRouter,
    _params: Value,
) -> BoxFuture<'_, Result<Value, RouterError>> {
    async move { encode(TOOLS_LIST, &router.list_tools()) }.boxed()
}

fn handle_tools_call(
    router: &ProtocolRouter,
    params: Value,
) -> BoxFuture<'_, Result<Value, RouterError>> {
    async move {
        let params: NamedCallParams = decode(TOOLS_CALL, params)?;
        require_name(TOOLS_CALL, &params.name)?;
        let result = router.call_tool(&params.name, params.arguments).await?;
        encode(TOOLS_CALL, &result)
    }
    .boxed()
}

fn handle_prompts_list(
    router: &ProtocolRouter,
    _params: Value,
) -> BoxFuture<'_, Result<Value, RouterError>> {
    async move { encode(PROMPTS_LIST, &router.list_prompts()) }.boxed()
}

fn handle_prompts_get(
    router: &ProtocolRouter,
    params: Value,
) -> BoxFuture<'_, Result<Value, RouterError>> {
    async move {
        let params: NamedCallParams = decode(PROMPTS_GET, params)?;
        require_name(PROMPTS_GET, &params.name)?;
        let result = router.get_prompt(&params.name, params.arguments).await?;
        encode(PROMPTS_GET, &result)
    }
    .boxed()
}

fn handle_resources_list(
    router: &ProtocolRouter,
    _params: Value,
) -> BoxFuture<'_, Result<Value, RouterError>> {
    async move { encode(RESOURCES_LIST, &router.list_resources()) }.boxed()
}

fn handle_resources_read(
    router: &ProtocolRouter,
    params: Value,
) -> BoxFuture<'_, Result<Value, RouterError>> {
    async move {
        let params: ReadResourceParams = decode(RESOURCES_READ, params)?;
        if params.uri.trim().is_empty() {
            return Err(RouterError::invalid_argument(RESOURCES_READ, "uri is required"));
        }
        let result = router.read_resource(params).await?;
        encode(RESOURCES_READ, &result)
    }
    .boxed()
}

fn handle_ardf_list(
    router: &ProtocolRouter,
    params: Value,
) -> BoxFuture<'_, Result<Value, RouterError>> {
    async move {
        let criteria: DescriptorFilter = decode(ARDF_LIST, params)?;
        encode(ARDF_LIST, &router.ardf_list(&criteria))
    }
    .boxed()
}

/// Decodes method params; absent params decode as the default value.
fn decode<T: DeserializeOwned + Default>(method: &str, params: Value) -> Result<T, RouterError> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params)
        .map_err(|err| RouterError::invalid_argument(method, err.to_string()))
}

fn encode<T: Serialize>(method: &str, result: &T) -> Result<Value, RouterError> {
    serde_json::to_value(result)
        .map_err(|err| RouterError::invalid_response(method, err.to_string()))
}

fn require_name(method: &str, name: &str) -> Result<(), RouterError> {
    if name.trim().is_empty() {
        return Err(RouterError::invalid_argument(method, "name is required"));
    }
    Ok(())
}

/// Arguments arrive as an object, a JSON-encoded object or nothing at all.
fn coerce_arguments(target: &str, raw: Value) -> Result<Map<String, Value>, RouterError> {
    match raw {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        Value::String(text) if text.trim().is_empty() => Ok(Map::new()),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(RouterError::invalid_argument(
                target,
                format!("arguments must be a JSON object, got {other}"),
            )),
            Err(err) => Err(RouterError::invalid_argument(
                target,
                format!("arguments are not valid JSON: {err}"),
            )),
        },
        other => Err(RouterError::invalid_argument(
            target,
            format!("arguments must be a JSON object, got {other}"),
        )),
    }
}

/// Shapes locally produced text into the declared response type.
fn text_block(
    target: &str,
    text: String,
    response_type: ResponseType,
) -> Result<ContentBlock, RouterError> {
    match response_type {
        ResponseType::Text => Ok(ContentBlock::text(text)),
        ResponseType::Json => {
            let source = if text.trim().is_empty() { "{}" } else { text.as_str() };
            serde_json::from_str(source).map(ContentBlock::json).map_err(|err| {
                RouterError::invalid_response(target, format!("content is not valid JSON: {err}"))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_arguments_must_be_json_objects() {
        assert_eq!(
            coerce_arguments("t", json!("{\"a\": 1}")).expect("object parses"),
            json!({"a": 1}).as_object().cloned().expect("object")
        );
        assert!(coerce_arguments("t", json!("")).expect("empty").is_empty());
        assert!(coerce_arguments("t", Value::Null).expect("null").is_empty());
        assert!(matches!(
            coerce_arguments("t", json!("[1]")),
            Err(RouterError::InvalidArgument { .. })
        ));
        assert!(matches!(
            coerce_arguments("t", json!("{oops")),
            Err(RouterError::InvalidArgument { .. })
        ));
        assert!(matches!(
            coerce_arguments("t", json!(5)),
            Err(RouterError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn json_text_blocks_default_to_an_empty_object() {
        assert_eq!(
            text_block("t", "  ".into(), ResponseType::Json).expect("empty parses"),
            ContentBlock::json(json!({}))
        );
        assert!(matches!(
            text_block("t", "nope".into(), ResponseType::Json),
            Err(RouterError::InvalidResponse { target, .. }) if target == "t"
        ));
    }

    #[test]
    fn ardf_list_is_only_routed_when_enabled() {
        let registry =
            Arc::new(DescriptorRegistry::new(Default::default()).expect("empty registry"));
        let enabled = ProtocolRouter::new(registry.clone(), RouterSettings::default());
        assert!(enabled.supports(ARDF_LIST));
        assert_eq!(enabled.methods().len(), 7);

        let disabled = ProtocolRouter::new(
            registry,
            RouterSettings {
                ardf_enabled: false,
                ..RouterSettings::default()
            },
        );
        assert!(!disabled.supports(ARDF_LIST));
        assert_eq!(disabled.methods().len(), 6);
    }
}
