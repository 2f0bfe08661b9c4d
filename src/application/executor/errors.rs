use crate::application::client::ClientError;
use crate::infrastructure::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("goal must not be empty")]
    EmptyGoal,
}

impl ExecutorError {
    pub fn user_message(&self) -> String {
        match self {
            ExecutorError::EmptyGoal => "Describe what you want the agent to do.".to_string(),
        }
    }
}

/// Why a single plan step failed. Recorded in the run log, never propagated.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl StepError {
    pub fn user_message(&self) -> String {
        match self {
            StepError::Client(err) => err.user_message(),
            StepError::Model(err) => err.user_message(),
        }
    }
}
