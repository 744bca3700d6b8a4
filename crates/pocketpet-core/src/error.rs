//! Core error types for pocketpet-core.
//!
//! This module defines the error hierarchy using thiserror. Configuration
//! errors are fatal at startup; minigame errors are recovered by the engine
//! and only surface through logs and events.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pocketpet-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Minigame launch and reporting errors
    #[error("Minigame error: {0}")]
    Minigame(#[from] MinigameError),

    /// Admin passphrase did not match
    #[error("Admin access denied")]
    Unauthorized,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// No built-in profile with this id
    #[error("Unknown profile '{0}'")]
    UnknownProfile(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Stat name not recognised
    #[error("Unknown stat '{0}'")]
    UnknownStat(String),

    /// Sprite key not recognised
    #[error("Unknown sprite '{0}'")]
    UnknownSprite(String),

    /// Pausing is disabled or the budget is spent
    #[error("Pause unavailable: {remaining_secs}s of pause budget left")]
    PauseUnavailable { remaining_secs: u64 },

    /// The session already ended
    #[error("Session is over")]
    SessionOver,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Minigame boundary errors.
#[derive(Error, Debug)]
pub enum MinigameError {
    /// No minigame registered under this name
    #[error("Unknown minigame '{0}'")]
    UnknownGame(String),

    /// No minigames registered at all
    #[error("Minigame catalog is empty")]
    EmptyCatalog,

    /// The component failed while starting
    #[error("Minigame '{game}' failed to launch: {message}")]
    LaunchFailed { game: String, message: String },

    /// The component dropped its reporter without a result
    #[error("Minigame '{0}' ended without reporting a result")]
    Abandoned(String),

    /// A popup or minigame is already active
    #[error("A minigame is already pending or running")]
    Busy,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
