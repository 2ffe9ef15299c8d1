//! Configuration read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;
use monitor_engine::{SmtpSettings, DEFAULT_SELECTOR, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use thiserror::Error;

pub const DEFAULT_MAX_NOTIFICATIONS: usize = 5;
pub const DEFAULT_STATE_FILE: &str = "products.json";
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub monitor_url: String,
    pub css_selector: String,
    pub max_notifications: usize,
    pub state_file: PathBuf,
    pub smtp: SmtpSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let monitor_url = get("MONITOR_URL")
            .map(|url| url.trim().to_string())
            .ok_or(ConfigError::Missing("MONITOR_URL"))?;

        Ok(Self {
            monitor_url,
            css_selector: get("CSS_SELECTOR").unwrap_or_else(|| DEFAULT_SELECTOR.to_string()),
            max_notifications: parse_or(
                "MAX_NOTIFICATIONS_PER_RUN",
                get("MAX_NOTIFICATIONS_PER_RUN"),
                DEFAULT_MAX_NOTIFICATIONS,
            )?,
            state_file: get("MONITOR_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            smtp: SmtpSettings {
                host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: parse_or("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
                username: get("SMTP_USER"),
                password: get("SMTP_PASS"),
                target: get("SMS_TARGET"),
                timeout: SMTP_TIMEOUT,
            },
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: err.to_string(),
        }),
    }
}

/// Logger options, read before the rest of the configuration so that
/// configuration errors can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub file: Option<PathBuf>,
    /// Unrecognised `MONITOR_LOG_LEVEL` value; info is used instead.
    pub rejected_level: Option<String>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let (level, rejected_level) = match get("MONITOR_LOG_LEVEL") {
            None => (LevelFilter::Info, None),
            Some(name) => match monitor_logging::parse_level(&name) {
                Some(level) => (level, None),
                None => (LevelFilter::Info, Some(name)),
            },
        };
        Self {
            level,
            file: get("MONITOR_LOG_FILE").map(PathBuf::from),
            rejected_level,
        }
    }
}
