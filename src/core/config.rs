//! Configuration file management.
//!
//! Reads the secret backend settings from `.unseal.toml` (or an explicit
//! path) and applies `UNSEAL_*` environment overrides on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Secret backend configuration.
///
/// ```toml
/// secret_backend_command = "/usr/local/bin/fetch-secrets"
/// secret_backend_arguments = ["--vault", "prod"]
/// secret_backend_timeout = 5
/// secret_backend_output_max_size = 1048576
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Backend executable. Empty disables resolution entirely.
    pub secret_backend_command: String,
    /// Arguments passed to the backend, in order.
    pub secret_backend_arguments: Vec<String>,
    /// Wall-clock limit for one backend run, in seconds.
    pub secret_backend_timeout: u64,
    /// Cap on captured backend stdout, in bytes.
    pub secret_backend_output_max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_backend_command: String::new(),
            secret_backend_arguments: Vec::new(),
            secret_backend_timeout: constants::DEFAULT_TIMEOUT_SECS,
            secret_backend_output_max_size: constants::DEFAULT_OUTPUT_MAX_SIZE,
        }
    }
}

impl Config {
    /// Path to the default configuration file in the current directory
    pub fn config_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Load configuration, apply environment overrides, and validate.
    ///
    /// With `path == None` the default `.unseal.toml` is read if present;
    /// its absence simply leaves resolution disabled.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if an explicit path does not exist,
    /// `ConfigError::Parse` for malformed TOML, and
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()).into());
                }
                Self::from_file(path)?
            }
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!("no config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;

        debug!(
            enabled = config.is_enabled(),
            timeout = config.secret_backend_timeout,
            output_max_size = config.secret_backend_output_max_size,
            "config loaded"
        );
        Ok(config)
    }

    /// Parse a config file without overrides or validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&contents)
    }

    /// Parse config from a TOML string.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents).map_err(ConfigError::Parse)?)
    }

    /// Apply `UNSEAL_SECRET_BACKEND_*` overrides looked up through `lookup`.
    ///
    /// Arguments are split on whitespace.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("{}{}", constants::ENV_PREFIX, key.to_uppercase()));

        if let Some(command) = var("secret_backend_command") {
            self.secret_backend_command = command;
        }
        if let Some(args) = var("secret_backend_arguments") {
            self.secret_backend_arguments = args.split_whitespace().map(String::from).collect();
        }
        if let Some(timeout) = var("secret_backend_timeout") {
            self.secret_backend_timeout =
                parse_number("secret_backend_timeout", &timeout)?;
        }
        if let Some(size) = var("secret_backend_output_max_size") {
            self.secret_backend_output_max_size =
                parse_number("secret_backend_output_max_size", &size)?;
        }
        Ok(())
    }

    /// Validate limits.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the timeout or output size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.secret_backend_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "secret_backend_timeout",
                reason: "must be at least 1 second".to_string(),
            }
            .into());
        }
        if self.secret_backend_output_max_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "secret_backend_output_max_size",
                reason: "must be at least 1 byte".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Whether a backend command is configured.
    pub fn is_enabled(&self) -> bool {
        !self.secret_backend_command.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.secret_backend_timeout)
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        ConfigError::InvalidValue {
            field,
            reason: format!("'{}': {}", raw, e),
        }
        .into()
    })
}
