use std::time::Duration;

use thiserror::Error;

pub const BASE_URL_VAR: &'static str = "BASE_URL";

pub const API_KEY_VAR: &'static str = "RIJKSMUSEUM_API_KEY";

pub const TIMEOUT_VAR: &'static str = "RIJKSMUSEUM_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not defined")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("language code must not be empty")]
    EmptyLanguage,
}

/// Everything a client needs to talk to the collection API. Build this once
/// at startup and hand out references to it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl ApiConfig {
    pub fn new<T: AsRef<str>, U: Into<String>>(
        base_url: T,
        api_key: U,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(ConfigError::Missing(BASE_URL_VAR));
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::Missing(API_KEY_VAR));
        }
        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like `from_env`, but reads variables through `lookup`. Empty values
    /// count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| lookup(name).filter(|value| !value.trim().is_empty());
        let base_url = read(BASE_URL_VAR).ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        let api_key = read(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let mut config = Self::new(base_url, api_key)?;
        if let Some(value) = read(TIMEOUT_VAR) {
            match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: TIMEOUT_VAR,
                        value,
                    })
                }
            }
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
