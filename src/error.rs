//! Error types for unseal.
//!
//! Each concern gets its own enum; [`Error`] wraps them so callers can match
//! on the category and `?` works across module boundaries.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error returned by every fallible operation in the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A handle requested from the backend was absent during substitution.
    #[error("unknown secret '{0}': not resolved by the backend")]
    Consistency(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no secret_backend_command set: could not resolve secrets")]
    NoBackendCommand,

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors produced while talking to the secret backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("invalid executable '{path}': {reason}")]
    Permission { path: String, reason: String },

    #[error("error while running '{command}': command timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("error while running '{command}': output exceeded {limit} bytes")]
    OutputTooLarge { command: String, limit: usize },

    #[error("error while running '{command}': {reason}")]
    Execution { command: String, reason: String },

    #[error("could not serialize secrets request: {0}")]
    Request(#[source] serde_json::Error),

    #[error("could not parse secret_backend_command output: {0}")]
    Protocol(#[source] serde_json::Error),

    #[error("secret handle '{0}' was not resolved by secret_backend_command")]
    MissingHandle(String),

    #[error("backend failed to resolve '{handle}': {message}")]
    Rejected { handle: String, message: String },

    #[error("resolved secret for '{0}' is empty")]
    EmptySecret(String),
}

/// Document parsing, serialization, and reference errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("could not parse document: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("could not serialize document after resolving secrets: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("invalid secret reference '{0}': handle is empty")]
    InvalidReference(String),
}

pub type Result<T> = std::result::Result<T, Error>;
