use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskRunnerError {
    #[error("task runner could not be initialised: {source}")]
    Setup {
        #[source]
        source: reqwest::Error,
    },
    #[error("task runner transport error for '{workflow}': {source}")]
    Transport {
        workflow: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("task runner timed out running '{workflow}'")]
    Timeout { workflow: String },
    #[error("task runner rejected '{workflow}' with HTTP status {status}")]
    Status { workflow: String, status: u16 },
    #[error("task runner returned invalid JSON for '{workflow}': {source}")]
    InvalidJson {
        workflow: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("task runner reported a failure for '{workflow}': {message}")]
    Failed { workflow: String, message: String },
}

impl TaskRunnerError {
    pub(crate) fn from_reqwest(workflow: &str, source: reqwest::Error) -> Self {
        let workflow = workflow.to_string();
        if source.is_timeout() {
            TaskRunnerError::Timeout { workflow }
        } else if let Some(status) = source.status() {
            TaskRunnerError::Status {
                workflow,
                status: status.as_u16(),
            }
        } else if source.is_decode() {
            TaskRunnerError::InvalidJson { workflow, source }
        } else {
            TaskRunnerError::Transport { workflow, source }
        }
    }
}
