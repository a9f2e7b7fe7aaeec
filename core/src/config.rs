//! Client configuration.
//!
//! Defaults match the development backend. Hosts override through the
//! environment (`EMPLOYEE_API_BASE_URL`, `EMPLOYEE_CREDENTIALS_PATH`).

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const BASE_URL_VAR: &str = "EMPLOYEE_API_BASE_URL";
pub const CREDENTIALS_PATH_VAR: &str = "EMPLOYEE_CREDENTIALS_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix joined with every request path. Stored without a trailing slash.
    pub base_url: String,
    /// Where the bearer token is persisted; `None` keeps it in memory.
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::default().with_base_url(base_url)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_VAR).filter(|v| !v.is_empty()) {
            config = config.with_base_url(&url)?;
        }
        if let Some(path) = lookup(CREDENTIALS_PATH_VAR).filter(|v| !v.is_empty()) {
            config.credentials_path = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }
}
