use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid transcription service url {url:?}: {source}")]
    InvalidServiceUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub transcription: TranscriptionSettings,
}

/// Settings shared by the submission and status polling jobs.
#[derive(Clone, Debug, Deserialize)]
pub struct TranscriptionSettings {
    /// Base URL of the external service, without trailing slash.
    /// `None` disables both jobs.
    pub base_url: Option<String>,
    pub submit_interval: Duration,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            submit_interval: Duration::from_secs(300),
            poll_interval: Duration::from_secs(60),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let defaults = TranscriptionSettings::default();

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: required(EnvKey::DatabaseUrl)?,
            redis_url: required(EnvKey::RedisUrl)?,
            transcription: TranscriptionSettings {
                base_url: normalize_base_url(env::get_optional(EnvKey::TranscriptionServiceUrl))?,
                submit_interval: seconds(EnvKey::SubmitIntervalSecs, defaults.submit_interval)?,
                poll_interval: seconds(EnvKey::PollIntervalSecs, defaults.poll_interval)?,
                http_timeout: seconds(EnvKey::HttpTimeoutSecs, defaults.http_timeout)?,
            },
        })
    }
}

fn seconds(key: EnvKey, default: Duration) -> Result<Duration, ConfigError> {
    let name = key.as_str();
    non_zero_secs(name, env::get_parsed(key, default.as_secs()))
}

/// `tokio::time::interval` panics on a zero period, so zero is rejected at startup.
pub fn non_zero_secs(name: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ZeroDuration(name));
    }
    Ok(Duration::from_secs(secs))
}

fn required(key: EnvKey) -> Result<String, ConfigError> {
    let name = key.as_str();
    env::get(key).map_err(|_| ConfigError::Missing(name))
}

/// Validates the service URL and strips trailing slashes so endpoint paths
/// can be appended with `format!`.
pub fn normalize_base_url(raw: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Url::parse(trimmed).map_err(|source| ConfigError::InvalidServiceUrl {
        url: trimmed.to_string(),
        source,
    })?;

    Ok(Some(trimmed.trim_end_matches('/').to_string()))
}
