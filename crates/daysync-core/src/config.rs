//! Run configuration.
//!
//! Every path the pipeline touches comes from the environment:
//! - `JSON_FOLDER`: day-type files plus `calendar.json`
//! - `TOKEN_PATH`: cached OAuth token
//! - `CREDENTIALS_PATH`: OAuth client secrets
//! - `ANALYTICS_CONFIG_PATH`: per-activity tracking and wages
//!
//! `DAYSYNC_CALENDAR_ID` and `DAYSYNC_TIME_ZONE` are optional overrides.

use std::path::PathBuf;

use chrono_tz::Tz;

use crate::error::{ConfigError, Result};

/// File name of the calendar-assignment list inside the data folder.
pub const CALENDAR_FILE: &str = "calendar.json";

/// Files whose name contains this marker are never loaded as day types.
pub const ANALYTICS_CONFIG_MARKER: &str = "analytics_config";

pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_TIME_ZONE: Tz = Tz::Europe__Paris;

/// Configuration assembled once at process start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub json_folder: PathBuf,
    pub token_path: PathBuf,
    pub credentials_path: PathBuf,
    pub analytics_config_path: PathBuf,
    pub calendar_id: String,
    pub time_zone: Tz,
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key)
                .map(PathBuf::from)
                .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
        };

        let time_zone = match get("DAYSYNC_TIME_ZONE") {
            Some(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "DAYSYNC_TIME_ZONE".to_string(),
                    message: e.to_string(),
                })?,
            None => DEFAULT_TIME_ZONE,
        };

        Ok(Self {
            json_folder: require("JSON_FOLDER")?,
            token_path: require("TOKEN_PATH")?,
            credentials_path: require("CREDENTIALS_PATH")?,
            analytics_config_path: require("ANALYTICS_CONFIG_PATH")?,
            calendar_id: get("DAYSYNC_CALENDAR_ID")
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            time_zone,
        })
    }

    /// Path of the calendar-assignment list.
    pub fn calendar_path(&self) -> PathBuf {
        self.json_folder.join(CALENDAR_FILE)
    }
}
