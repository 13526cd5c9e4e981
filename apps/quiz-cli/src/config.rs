//! Environment configuration.

use quiz_core::{ReselectionPolicy, WidgetConfig};
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("QUIZ_RESELECTION must be \"revert\" or \"recolor\", got {0:?}")]
    InvalidReselection(String),

    #[error("QUIZ_BASE_URL is not a valid URL ({value:?}): {message}")]
    InvalidBaseUrl { value: String, message: String },
}

/// Settings read from the environment (and `.env`).
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub widget: WidgetConfig,
    /// Base for relative fragment URLs when the page is a local file.
    pub base_url: Option<Url>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("QUIZ_RESELECTION").filter(|v| !v.trim().is_empty()) {
            config.widget.reselection = ReselectionPolicy::from_str(&raw)
                .ok_or(ConfigError::InvalidReselection(raw))?;
        }

        if let Some(raw) = lookup("QUIZ_BASE_URL").filter(|v| !v.trim().is_empty()) {
            let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
                message: e.to_string(),
                value: raw.clone(),
            })?;
            config.base_url = Some(url);
        }

        Ok(config)
    }
}
