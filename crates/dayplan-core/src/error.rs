//! Core error types for dayplan-core.
//!
//! This module defines the error hierarchy using thiserror. Only the
//! boundaries (storage, configuration, task validation) surface errors to
//! callers; advisor failures are recovered inside the optimizer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dayplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Row that should exist is missing
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
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
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors raised at the task edit boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A time value that is not `HH:MM` within 00:00-23:59
    #[error("Invalid clock time '{0}': expected HH:MM between 00:00 and 23:59")]
    InvalidClock(String),

    /// Task title is empty or whitespace
    #[error("Task title must not be empty")]
    EmptyTitle,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors from the external advisor capability.
///
/// The optimizer treats every variant the same way: the advisor strategy
/// is reported unavailable and the next strategy runs.
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Advisor is switched off in configuration
    #[error("advisor is disabled")]
    Disabled,

    /// Request could not be sent or the connection dropped
    #[error("advisor transport failed: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("advisor did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Advisor answered with a non-success HTTP status
    #[error("advisor returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Advisor answered without any message content
    #[error("advisor reply contained no choices")]
    EmptyReply,

    /// Reply text carried no `{...}` span
    #[error("advisor reply contained no JSON object")]
    NoJsonObject,

    /// Reply JSON did not match the expected structure
    #[error("advisor reply did not match the response schema: {0}")]
    Malformed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdvisorError::Malformed(err.to_string())
        } else {
            AdvisorError::Transport(err.to_string())
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
