use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::error::TaskRunnerError;
use super::interface::TaskRunner;
use crate::config::TaskRunnerConfig;
use crate::domain::WorkflowReference;
use crate::infrastructure::model::factory::resolve_api_key;

/// Task runner reached over an HTTP webhook.
///
/// Each invocation posts `{workflow: {id, name}, payload}` to the configured
/// endpoint and returns the JSON body of the answer unchanged.
#[derive(Clone)]
pub struct HttpTaskRunner {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

#[derive(Serialize)]
struct InvokeRequest<'a> {
    workflow: &'a WorkflowReference,
    payload: Value,
}

impl HttpTaskRunner {
    pub fn from_config(config: &TaskRunnerConfig) -> Result<Self, TaskRunnerError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| TaskRunnerError::Setup { source })?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: resolve_api_key("task_runner", config.api_key.as_deref()),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TaskRunner for HttpTaskRunner {
    async fn invoke(
        &self,
        reference: &WorkflowReference,
        payload: Value,
    ) -> Result<Value, TaskRunnerError> {
        let label = reference.label();
        info!(
            workflow = label,
            endpoint = self.endpoint.as_str(),
            "Delegating capability to task runner"
        );

        let mut request = self.http.post(&self.endpoint).json(&InvokeRequest {
            workflow: reference,
            payload,
        });
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let body: Value = request
            .send()
            .await
            .map_err(|e| TaskRunnerError::from_reqwest(label, e))?
            .error_for_status()
            .map_err(|e| TaskRunnerError::from_reqwest(label, e))?
            .json()
            .await
            .map_err(|e| TaskRunnerError::from_reqwest(label, e))?;
        debug!(workflow = label, "Task runner answered");

        if let Some(message) = body
            .get("error")
            .and_then(|error| error.as_str().or_else(|| error.get("message")?.as_str()))
        {
            return Err(TaskRunnerError::Failed {
                workflow: label.to_string(),
                message: message.to_string(),
            });
        }
        Ok(body)
    }
}
