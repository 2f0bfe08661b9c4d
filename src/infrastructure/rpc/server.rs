use super::types::{
    DELEGATION_FAILED, INVALID_PARAMS, INVALID_RESPONSE, JSONRPC_VERSION, METHOD_NOT_FOUND,
    NOT_FOUND, RpcErrorData, RpcRequest, RpcResponse,
};
use crate::application::router::RouterError;
use crate::infrastructure::server::ServerState;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error};

pub const INITIALIZE: &str = "initialize";
pub const PING: &str = "ping";

pub(crate) async fn handle_rpc(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    debug!(method = %request.method, "Received JSON-RPC request");

    if request.jsonrpc != JSONRPC_VERSION {
        return Json(RpcResponse::invalid_request(
            "Unsupported jsonrpc version (expected 2.0)",
        ));
    }

    let id = request.id.clone();
    let response = match request.method.as_str() {
        INITIALIZE => RpcResponse::success(id, initialize_result(&state)),
        PING => RpcResponse::success(id, json!({})),
        method => {
            let params = request.params.unwrap_or(Value::Null);
            match state.router().dispatch(method, params).await {
                Ok(result) => RpcResponse::success(id, result),
                Err(err) => {
                    error!(method, kind = err.kind(), %err, "JSON-RPC request failed");
                    error_response(id, &err)
                }
            }
        }
    };

    Json(response)
}

fn initialize_result(state: &ServerState) -> Value {
    let settings = state.settings();
    let router = state.router();
    json!({
        "serverInfo": {
            "name": settings.name,
            "version": settings.version,
        },
        "capabilities": {
            "tools": {},
            "prompts": {},
            "resources": {},
            "ardf": { "enabled": router.settings().ardf_enabled },
        },
        "methods": router.methods(),
    })
}

pub(crate) fn error_response(id: Option<Value>, err: &RouterError) -> RpcResponse {
    let code = error_code(err);
    let response = match err {
        RouterError::MethodNotFound { method } => RpcResponse::method_not_found(id, method),
        other => RpcResponse::error(id, code, other.to_string()),
    };
    response.with_data(RpcErrorData::Value(json!({
        "kind": err.kind(),
        "target": err.target(),
    })))
}

pub(crate) fn error_code(err: &RouterError) -> i64 {
    match err {
        RouterError::MethodNotFound { .. } => METHOD_NOT_FOUND,
        RouterError::InvalidArgument { .. } => INVALID_PARAMS,
        RouterError::NotFound { .. } => NOT_FOUND,
        RouterError::InvalidResponse { .. } => INVALID_RESPONSE,
        RouterError::DelegationUnavailable { .. } | RouterError::Delegation { .. } => {
            DELEGATION_FAILED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::DescriptorRegistry;
    use crate::application::router::{CapabilityKind, ProtocolRouter, RouterSettings};
    use crate::config::ServerSettings;

    fn state() -> Arc<ServerState> {
        let registry = DescriptorRegistry::new(Default::default()).expect("empty registry");
        let router = ProtocolRouter::new(Arc::new(registry), RouterSettings::default());
        Arc::new(ServerState::new(Arc::new(router), ServerSettings::default()))
    }

    fn request(method: &str, params: Value) -> RpcRequest {
        RpcRequest::new(method, params, json!(1))
    }

    #[tokio::test]
    async fn dispatches_protocol_methods() {
        let Json(response) =
            handle_rpc(State(state()), Json(request("tools/list", json!({})))).await;
        assert_eq!(response.id, Some(json!(1)));
        assert_eq!(response.result, Some(json!({"tools": []})));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn unknown_methods_map_to_method_not_found() {
        let Json(response) =
            handle_rpc(State(state()), Json(request("tools/delete", json!({})))).await;
        let error = response.error.expect("error present");
        assert_eq!(error.code, -32601);
        assert_eq!(
            error.data,
            Some(RpcErrorData::Value(
                json!({"kind": "method_not_found", "target": "tools/delete"})
            ))
        );
    }

    #[tokio::test]
    async fn rejects_other_protocol_versions() {
        let mut bad = request(PING, json!({}));
        bad.jsonrpc = "1.0".into();
        let Json(response) = handle_rpc(State(state()), Json(bad)).await;
        assert_eq!(response.error.map(|e| e.code), Some(-32600));
    }

    #[tokio::test]
    async fn initialize_reports_server_identity() {
        let Json(response) =
            handle_rpc(State(state()), Json(request(INITIALIZE, Value::Null))).await;
        let result = response.result.expect("result present");
        assert_eq!(result["serverInfo"]["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(result["capabilities"]["ardf"]["enabled"], true);
    }

    #[test]
    fn router_errors_get_distinct_codes() {
        assert_eq!(
            error_code(&RouterError::not_found(CapabilityKind::Tool, "x")),
            -32004
        );
        assert_eq!(error_code(&RouterError::invalid_argument("x", "bad")), -32602);
        assert_eq!(error_code(&RouterError::invalid_response("x", "bad")), -32005);
        assert_eq!(
            error_code(&RouterError::DelegationUnavailable { target: "x".into() }),
            -32006
        );
    }
}
