//! API endpoint configuration.
//!
//! Defaults point at the development backend. A TOML file can override any
//! field, and `VITURA_API_BASE_URL` overrides the base URL last.

use std::path::Path;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Resource;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5120/api";
pub const BASE_URL_ENV: &str = "VITURA_API_BASE_URL";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where the two collections live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL shared by both collections
    pub base_url: String,
    /// Path segment of the patients collection
    pub patients_path: String,
    /// Path segment of the prescriptions collection
    pub prescriptions_path: String,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            patients_path: Resource::Patients.as_str().to_string(),
            prescriptions_path: Resource::Prescriptions.as_str().to_string(),
            user_agent: concat!("vitura-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Config with a different base URL and default paths.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Apply `VITURA_API_BASE_URL` if set.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_base_url_override(std::env::var(BASE_URL_ENV).ok())
    }

    fn with_base_url_override(mut self, base_url: Option<String>) -> ConfigResult<Self> {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {other:?}"),
            }),
        }
    }

    /// Collection URL, e.g. `http://localhost:5120/api/patients`.
    pub fn collection_url(&self, resource: Resource) -> String {
        let path = match resource {
            Resource::Patients => &self.patients_path,
            Resource::Prescriptions => &self.prescriptions_path,
        };
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }
}
