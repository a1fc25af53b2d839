//! Core error types for daysync-core.
//!
//! Fatal failures (configuration, credentials, data files, setup prompts)
//! surface as [`CoreError`]. Calendar API failures are [`CalendarError`]s,
//! which the publisher logs and recovers from per event.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for daysync-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OAuth-related errors
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Interactive setup errors
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A data file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file is not the JSON we expect
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// OAuth-specific errors.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Authorization failed
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Token exchange failed
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Invalid callback
    #[error("Invalid OAuth callback: {0}")]
    InvalidCallback(String),

    /// Client secrets file has neither an "installed" nor a "web" section
    #[error("Client secrets at {path} contain no 'installed' or 'web' client")]
    MissingClient { path: PathBuf },
}

/// Errors returned by a [`crate::calendar::CalendarService`].
#[derive(Error, Debug)]
pub enum CalendarError {
    /// The API answered with a non-success status
    #[error("API returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        details: String,
    },

    /// The request never got an answer
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured API root cannot carry a path
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl CalendarError {
    /// Raw error payload returned by the API, if any.
    pub fn details(&self) -> Option<&str> {
        match self {
            CalendarError::Api { details, .. } if !details.is_empty() => Some(details),
            _ => None,
        }
    }
}

/// Errors raised while collecting answers during analytics setup.
#[derive(Error, Debug)]
pub enum PromptError {
    /// The wage answer is not a number
    #[error("'{answer}' is not a valid hourly wage for '{activity}'")]
    InvalidWage { activity: String, answer: String },

    /// The answer source ran dry or was closed
    #[error("no answer available for: {0}")]
    NoAnswer(String),

    /// Console interaction failed
    #[error("console prompt failed: {0}")]
    Console(#[from] inquire::InquireError),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A calendar entry date that is not a real `YYYY-MM-DD` day
    #[error("'{0}' is not a valid date")]
    InvalidDate(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
