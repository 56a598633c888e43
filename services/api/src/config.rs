//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use study_assistant_core::DEFAULT_WEAK_TOPIC_THRESHOLD;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the quiz history is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryBackend {
    Sqlite,
    File,
    Memory,
}

impl FromStr for HistoryBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(HistoryBackend::Sqlite),
            "file" => Ok(HistoryBackend::File),
            "memory" => Ok(HistoryBackend::Memory),
            other => Err(format!("'{}' is not one of sqlite, file, memory", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub allowed_origin: String,
    pub provider_api_key: Option<String>,
    pub provider_base_url: Option<String>,
    pub notes_model: String,
    pub quiz_model: String,
    pub history_backend: HistoryBackend,
    pub database_url: String,
    pub history_dir: PathBuf,
    pub history_slot: String,
    pub weak_topic_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            allowed_origin: "http://localhost:3000".to_string(),
            provider_api_key: None,
            provider_base_url: None,
            notes_model: "gpt-4o-mini".to_string(),
            quiz_model: "gpt-4o-mini".to_string(),
            history_backend: HistoryBackend::Sqlite,
            database_url: "sqlite://study_assistant.db?mode=rwc".to_string(),
            history_dir: PathBuf::from("./data"),
            history_slot: "quizAnalytics".to_string(),
            weak_topic_threshold: DEFAULT_WEAK_TOPIC_THRESHOLD,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        // --- Load Server Settings ---
        let bind_address = match std::env::var("BIND_ADDRESS") {
            Ok(value) => value.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            Err(_) => defaults.bind_address,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin =
            std::env::var("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin);

        // --- Load Answer Provider Settings ---
        let provider_api_key = ["PROVIDER_API_KEY", "OPENAI_API_KEY", "GEMINI_API_KEY"]
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty());
        let provider_base_url = std::env::var("PROVIDER_BASE_URL").ok();
        let notes_model = std::env::var("NOTES_MODEL").unwrap_or(defaults.notes_model);
        let quiz_model = std::env::var("QUIZ_MODEL").unwrap_or(defaults.quiz_model);

        // --- Load History Settings ---
        let history_backend = match std::env::var("HISTORY_BACKEND") {
            Ok(value) => value
                .parse::<HistoryBackend>()
                .map_err(|e| ConfigError::InvalidValue("HISTORY_BACKEND".to_string(), e))?,
            Err(_) => defaults.history_backend,
        };
        let database_url = std::env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let history_dir = std::env::var("HISTORY_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.history_dir);
        let history_slot = std::env::var("HISTORY_SLOT").unwrap_or(defaults.history_slot);

        let weak_topic_threshold = match std::env::var("WEAK_TOPIC_THRESHOLD") {
            Ok(value) => parse_threshold(&value)?,
            Err(_) => defaults.weak_topic_threshold,
        };

        Ok(Self {
            bind_address,
            log_level,
            allowed_origin,
            provider_api_key,
            provider_base_url,
            notes_model,
            quiz_model,
            history_backend,
            database_url,
            history_dir,
            history_slot,
            weak_topic_threshold,
        })
    }

    /// The provider key, required to start the server.
    pub fn require_provider_api_key(&self) -> Result<&str, ConfigError> {
        self.provider_api_key.as_deref().ok_or_else(|| {
            ConfigError::MissingVar("PROVIDER_API_KEY (or OPENAI_API_KEY / GEMINI_API_KEY)".to_string())
        })
    }
}

fn parse_threshold(value: &str) -> Result<u32, ConfigError> {
    let invalid = || {
        ConfigError::InvalidValue(
            "WEAK_TOPIC_THRESHOLD".to_string(),
            format!("'{}' is not a percentage between 0 and 100", value),
        )
    };
    let threshold = value.trim().parse::<u32>().map_err(|_| invalid())?;
    if threshold > 100 {
        return Err(invalid());
    }
    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_backend_parses_known_names() {
        assert_eq!("SQLite".parse::<HistoryBackend>(), Ok(HistoryBackend::Sqlite));
        assert_eq!(" file ".parse::<HistoryBackend>(), Ok(HistoryBackend::File));
        assert_eq!("memory".parse::<HistoryBackend>(), Ok(HistoryBackend::Memory));
        assert!("redis".parse::<HistoryBackend>().is_err());
    }

    #[test]
    fn threshold_must_be_a_percentage() {
        assert_eq!(parse_threshold("75").unwrap(), 75);
        assert!(parse_threshold("101").is_err());
        assert!(parse_threshold("-1").is_err());
        assert!(parse_threshold("sixty").is_err());
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.history_slot, "quizAnalytics");
        assert_eq!(config.weak_topic_threshold, 60);
        assert!(config.require_provider_api_key().is_err());
    }
}
