//! Runtime configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::notify::ErrorCode;
use crate::services::source::{DEFAULT_FETCH_LATENCY_MS, DEFAULT_LEAD_COUNT};
use crate::services::voice::{DEFAULT_LISTEN_MS, DEFAULT_PROCESS_MS, DEFAULT_SPEAK_MS_PER_CHAR, VoiceTimings};

pub const DEFAULT_SETTINGS_PATH: &str = "leadboard-settings.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {var}={value:?}")]
    Parse { var: String, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "E_CONFIG_PARSE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Leads generated for the initial seed and every refresh.
    pub seed_count: usize,
    pub refresh_latency: Duration,
    pub settings_path: PathBuf,
    pub voice: VoiceTimings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed_count: DEFAULT_LEAD_COUNT,
            refresh_latency: Duration::from_millis(DEFAULT_FETCH_LATENCY_MS),
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            voice: VoiceTimings::default(),
        }
    }
}

impl AppConfig {
    /// Build config from environment variables. Every key is optional.
    ///
    /// - `LEADS_SEED_COUNT`: default 25
    /// - `LEADS_REFRESH_LATENCY_MS`: default 1000
    /// - `LEADS_SETTINGS_PATH`: default `leadboard-settings.json`
    /// - `VOICE_LISTEN_MS`: default 2000
    /// - `VOICE_PROCESS_MS`: default 1500
    /// - `VOICE_SPEAK_MS_PER_CHAR`: default 30
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if a present value is not a valid number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings_path = std::env::var("LEADS_SETTINGS_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH), PathBuf::from);

        Ok(Self {
            seed_count: env_parse("LEADS_SEED_COUNT", DEFAULT_LEAD_COUNT)?,
            refresh_latency: env_millis("LEADS_REFRESH_LATENCY_MS", DEFAULT_FETCH_LATENCY_MS)?,
            settings_path,
            voice: VoiceTimings {
                listen: env_millis("VOICE_LISTEN_MS", DEFAULT_LISTEN_MS)?,
                process: env_millis("VOICE_PROCESS_MS", DEFAULT_PROCESS_MS)?,
                speak_per_char: env_millis("VOICE_SPEAK_MS_PER_CHAR", DEFAULT_SPEAK_MS_PER_CHAR)?,
            },
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Parse { var: key.to_string(), value: raw }),
        Err(_) => Ok(default),
    }
}

fn env_millis(key: &str, default_ms: u64) -> Result<Duration, ConfigError> {
    env_parse(key, default_ms).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
