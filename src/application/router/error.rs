use crate::application::tooling::TaskRunnerError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Tool,
    Prompt,
    Resource,
}

impl CapabilityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityKind::Tool => "tool",
            CapabilityKind::Prompt => "prompt",
            CapabilityKind::Resource => "resource",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced by protocol methods. Each variant names what failed.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("method '{method}' is not supported by this server")]
    MethodNotFound { method: String },
    #[error("{kind} '{name}' not found")]
    NotFound { kind: CapabilityKind, name: String },
    #[error("invalid arguments for '{target}': {reason}")]
    InvalidArgument { target: String, reason: String },
    #[error("'{target}' produced an invalid response: {reason}")]
    InvalidResponse { target: String, reason: String },
    #[error("'{target}' is delegated but no task runner is configured")]
    DelegationUnavailable { target: String },
    #[error("task runner failed for '{target}': {source}")]
    Delegation {
        target: String,
        #[source]
        source: TaskRunnerError,
    },
}

impl RouterError {
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    pub fn not_found(kind: CapabilityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn invalid_argument(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_response(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::MethodNotFound { .. } => "method_not_found",
            RouterError::NotFound { .. } => "not_found",
            RouterError::InvalidArgument { .. } => "invalid_argument",
            RouterError::InvalidResponse { .. } => "invalid_response",
            RouterError::DelegationUnavailable { .. } => "delegation_unavailable",
            RouterError::Delegation { .. } => "delegation_failed",
        }
    }

    /// The method, capability name or uri the failure is about.
    pub fn target(&self) -> &str {
        match self {
            RouterError::MethodNotFound { method } => method,
            RouterError::NotFound { name, .. } => name,
            RouterError::InvalidArgument { target, .. }
            | RouterError::InvalidResponse { target, .. }
            | RouterError::DelegationUnavailable { target }
            | RouterError::Delegation { target, .. } => target,
        }
    }
}
