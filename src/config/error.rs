use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [{section}] entry '{name}': {reason}")]
    InvalidEntry {
        section: &'static str,
        name: String,
        reason: String,
    },

    #[error("server bind address '{value}' is not a valid socket address")]
    InvalidBindAddress { value: String },

    #[error("[ardf] page_size must be greater than zero")]
    InvalidPageSize,

    #[error("[{section}] requires field '{field}'")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    #[error("no chat backend configured - add a [chat] section or pass --provider and --model")]
    MissingChat,
}

impl ConfigError {
    pub fn invalid_entry(
        section: &'static str,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEntry {
            section,
            name: name.into(),
            reason: reason.into(),
        }
    }
}
