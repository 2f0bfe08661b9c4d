use super::error::ServerError;
use super::state::ServerState;
use crate::infrastructure::rpc::handle_rpc;
use axum::extract::State;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub(super) fn build_app(state: Arc<ServerState>) -> Result<Router, ServerError> {
    let cors = cors_layer(&state.settings().cors_origins)?;
    Ok(Router::new()
        .route("/rpc", post(handle_rpc))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state))
}

pub(super) async fn serve(state: Arc<ServerState>, addr: SocketAddr) -> Result<(), ServerError> {
    info!(%addr, "Binding JSON-RPC server");
    let app = build_app(state)?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "JSON-RPC server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}

/// An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, ServerError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ServerError::InvalidOrigin {
                origin: origin.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(origins))
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<Value> {
    let settings = state.settings();
    Json(json!({
        "status": "ok",
        "name": settings.name,
        "version": settings.version,
        "methods": state.router().methods(),
    }))
}
