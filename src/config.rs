use std::fmt;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Gemini API key for the free-text answering fallback (empty =
    /// disabled).
    #[serde(default)]
    gemini_api_key: String,
    /// Local time-of-day for contract reminders.
    #[serde(default = "default_reminder_hour")]
    reminder_hour: u32,
    #[serde(default = "default_reminder_minute")]
    reminder_minute: u32,
    /// IANA timezone for the reminder clock.
    #[serde(default = "default_timezone")]
    timezone: String,
    /// Pause between follow-up sends, in milliseconds.
    #[serde(default = "default_follow_up_delay_ms")]
    follow_up_delay_ms: u64,
    /// Request timeout for the answering capability, in seconds.
    #[serde(default = "default_answer_timeout_secs")]
    answer_timeout_secs: u64,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
}

fn default_reminder_hour() -> u32 {
    15
}

fn default_reminder_minute() -> u32 {
    30
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

fn default_follow_up_delay_ms() -> u64 {
    1000
}

fn default_answer_timeout_secs() -> u64 {
    30
}

pub struct Config {
    pub telegram_bot_token: String,
    pub gemini_api_key: String,
    pub reminder_hour: u32,
    pub reminder_minute: u32,
    pub timezone: Tz,
    pub follow_up_delay_ms: u64,
    pub answer_timeout_secs: u64,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        if file.reminder_hour >= 24 || file.reminder_minute >= 60 {
            return Err(ConfigError::Validation(format!(
                "reminder time {:02}:{:02} is not a valid time of day",
                file.reminder_hour, file.reminder_minute
            )));
        }

        let timezone: Tz = file.timezone.parse().map_err(|_| {
            ConfigError::Validation(format!("unknown timezone '{}'", file.timezone))
        })?;

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            gemini_api_key: file.gemini_api_key,
            reminder_hour: file.reminder_hour,
            reminder_minute: file.reminder_minute,
            timezone,
            follow_up_delay_ms: file.follow_up_delay_ms,
            answer_timeout_secs: file.answer_timeout_secs,
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config_with_defaults() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.reminder_hour, 15);
        assert_eq!(config.reminder_minute, 30);
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.follow_up_delay_ms, 1000);
        assert_eq!(config.answer_timeout_secs, 30);
        assert!(config.gemini_api_key.is_empty());
    }

    #[test]
    fn test_explicit_fields_override_defaults() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "reminder_hour": 9,
            "reminder_minute": 0,
            "timezone": "America/Fortaleza",
            "follow_up_delay_ms": 250
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.reminder_hour, 9);
        assert_eq!(config.reminder_minute, 0);
        assert_eq!(config.timezone, chrono_tz::America::Fortaleza);
        assert_eq!(config.follow_up_delay_ms, 250);
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{
            "telegram_bot_token": ""
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let file = write_config(r#"{
            "telegram_bot_token": "invalid_token_no_colon"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_non_numeric_id() {
        let file = write_config(r#"{
            "telegram_bot_token": "notanumber:ABCdef"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_reminder_hour() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "reminder_hour": 24
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("valid time of day"));
    }

    #[test]
    fn test_unknown_timezone() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "timezone": "Mars/Olympus_Mons"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("timezone"));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
