use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_LOCALE: &str = "en_us";
pub const DEFAULT_FAN_OUT_LIMIT: usize = 50;
pub const DEFAULT_SINGLE_SCOPE_LIMIT: usize = 20;

/// Tunables for one search session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period before a burst of query changes turns into a search.
    pub debounce_ms: u64,
    /// Fixed `lang` request parameter.
    pub locale: String,
    /// Page size per scope when the live scope is `All`.
    pub fan_out_limit: usize,
    /// Page size when a single concrete scope is searched.
    pub single_scope_limit: usize,
    /// Per-scope fetch deadline. `None` waits for the provider indefinitely.
    pub request_timeout_ms: Option<u64>,
    /// Transition hint passed to snapshot subscribers.
    pub animate_transitions: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            locale: DEFAULT_LOCALE.to_string(),
            fan_out_limit: DEFAULT_FAN_OUT_LIMIT,
            single_scope_limit: DEFAULT_SINGLE_SCOPE_LIMIT,
            request_timeout_ms: None,
            animate_transitions: true,
        }
    }
}

impl SessionConfig {
    /// `<config dir>/store-search/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("store-search").join("config.json"))
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`SessionConfig::from_file`] on the default path, falling back to the
    /// defaults when no file exists there.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn with_limits(mut self, fan_out_limit: usize, single_scope_limit: usize) -> Self {
        self.fan_out_limit = fan_out_limit;
        self.single_scope_limit = single_scope_limit;
        self
    }
}
