use super::{ClientError, ProtocolClient};
use crate::application::router::ProtocolRouter;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Calls a router living in the same process, without any transport.
#[derive(Clone)]
pub struct LocalProtocolClient {
    router: Arc<ProtocolRouter>,
}

impl LocalProtocolClient {
    pub fn new(router: Arc<ProtocolRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl ProtocolClient for LocalProtocolClient {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        Ok(self.router.dispatch(method, params).await?)
    }
}
