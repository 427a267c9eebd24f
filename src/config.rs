// src/config.rs
//! Process configuration from the environment (and `.env` in local runs).

use std::path::PathBuf;

use crate::relevance::ENV_SELECTION_CONFIG_PATH;
use crate::selector::DEFAULT_TARGET_COUNT;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/news.db";

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_TARGET_COUNT: &str = "SELECTION_TARGET_COUNT";
pub const ENV_LOG_FORMAT: &str = "SELECTION_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<String>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    /// Explicit keyword-table path; `None` means default path or built-in tables.
    pub selection_config_path: Option<PathBuf>,
    pub target_count: usize,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            selection_config_path: None,
            target_count: DEFAULT_TARGET_COUNT,
            log_format: LogFormat::Compact,
        }
    }
}

// parse a positive count; anything else falls back to the default
fn parse_target_count(raw: Option<String>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_TARGET_COUNT)
}

impl AppConfig {
    /// Read the process environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        let database_url = std::env::var(ENV_DATABASE_URL)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Self {
            database_url,
            selection_config_path: std::env::var(ENV_SELECTION_CONFIG_PATH).ok().map(PathBuf::from),
            target_count: parse_target_count(std::env::var(ENV_TARGET_COUNT).ok()),
            log_format: LogFormat::parse(std::env::var(ENV_LOG_FORMAT).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_count_parsing() {
        assert_eq!(parse_target_count(None), 10);
        assert_eq!(parse_target_count(Some(" 7 ".into())), 7);
        assert_eq!(parse_target_count(Some("0".into())), 10);
        assert_eq!(parse_target_count(Some("-3".into())), 10);
        assert_eq!(parse_target_count(Some("ten".into())), 10);
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::parse(Some("JSON".into())), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty".into())), LogFormat::Compact);
        assert_eq!(LogFormat::parse(None), LogFormat::Compact);
    }
}
