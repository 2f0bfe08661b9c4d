use crate::application::router::RouterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP client could not be initialised: {0}")]
    Setup(#[source] reqwest::Error),
    #[error("transport failure calling '{method}': {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{method}' timed out")]
    Timeout { method: String },
    #[error("server rejected '{method}' ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error(transparent)]
    Router(#[from] RouterError),
    #[error("unexpected response to '{method}': {reason}")]
    Decode { method: String, reason: String },
}

impl ClientError {
    pub(crate) fn decode(method: &str, reason: impl Into<String>) -> Self {
        ClientError::Decode {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn from_reqwest(method: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ClientError::Timeout {
                method: method.to_string(),
            }
        } else {
            ClientError::Transport {
                method: method.to_string(),
                source,
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            ClientError::Setup(_) => "The protocol client could not be created.".to_string(),
            ClientError::Transport { method, .. } => {
                format!("Could not reach the server while calling {method}.")
            }
            ClientError::Timeout { method } => {
                format!("The server took too long to answer {method}.")
            }
            ClientError::Rpc { message, .. } => message.clone(),
            ClientError::Router(error) => error.to_string(),
            ClientError::Decode { method, .. } => {
                format!("The server sent an unexpected answer to {method}.")
            }
        }
    }
}
