use crate::domain::SearchScope;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of one external fetch (a scope query or an asset load).
///
/// None of these abort sibling work: a failed scope contributes no entities,
/// and cancellation is swallowed rather than reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error for {scope}: {message}")]
    Transport { scope: SearchScope, message: String },

    #[error("{scope} fetch timed out after {}ms", after.as_millis())]
    Timeout { scope: SearchScope, after: Duration },

    #[error("provider error for {scope}: {message}")]
    Provider { scope: SearchScope, message: String },

    #[error("asset load failed: {message}")]
    Asset { message: String },

    #[error("cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn transport(scope: SearchScope, message: impl Into<String>) -> Self {
        FetchError::Transport {
            scope,
            message: message.into(),
        }
    }

    pub fn provider(scope: SearchScope, message: impl Into<String>) -> Self {
        FetchError::Provider {
            scope,
            message: message.into(),
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Failure to load a catalog file for [`crate::search::catalog::CatalogExecutor`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to load a [`crate::config::SessionConfig`] file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
