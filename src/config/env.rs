use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    DatabaseUrl,
    RedisUrl,
    TranscriptionServiceUrl,
    SubmitIntervalSecs,
    PollIntervalSecs,
    HttpTimeoutSecs,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::RedisUrl => "REDIS_URL",
            EnvKey::TranscriptionServiceUrl => "TRANSCRIPTION_SERVICE_URL",
            EnvKey::SubmitIntervalSecs => "TRANSCRIPTION_SUBMIT_INTERVAL_SECS",
            EnvKey::PollIntervalSecs => "TRANSCRIPTION_POLL_INTERVAL_SECS",
            EnvKey::HttpTimeoutSecs => "TRANSCRIPTION_HTTP_TIMEOUT_SECS",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

/// Returns `None` for unset or blank variables.
pub fn get_optional(key: EnvKey) -> Option<String> {
    env::var(key.as_str())
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
