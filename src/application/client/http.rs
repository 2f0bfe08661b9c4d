use super::{ClientError, ProtocolClient};
use crate::infrastructure::rpc::{RpcRequest, RpcResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// JSON-RPC 2.0 client for a remote server's `/rpc` endpoint.
#[derive(Clone)]
pub struct HttpProtocolClient {
    endpoint: String,
    http: Client,
}

impl HttpProtocolClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Setup)?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProtocolClient for HttpProtocolClient {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = Uuid::new_v4().to_string();
        debug!(
            method,
            id = id.as_str(),
            endpoint = self.endpoint.as_str(),
            "Sending JSON-RPC request"
        );

        let request = RpcRequest::new(method, params, Value::String(id));
        let response: RpcResponse = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(method, e))?
            .json()
            .await
            .map_err(|e| ClientError::from_reqwest(method, e))?;

        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or_else(|| {
            ClientError::decode(method, "response carries neither result nor error")
        })
    }
}
