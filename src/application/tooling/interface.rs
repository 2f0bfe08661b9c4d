use async_trait::async_trait;
use serde_json::Value;

use super::error::TaskRunnerError;
use crate::domain::WorkflowReference;

/// External executor for capabilities whose implementation is delegated.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn invoke(
        &self,
        reference: &WorkflowReference,
        payload: Value,
    ) -> Result<Value, TaskRunnerError>;
}
