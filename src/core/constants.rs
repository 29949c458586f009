//! Constants used throughout unseal.
//!
//! Centralizes magic strings and default configuration values.

/// Configuration file name (.unseal.toml).
pub const CONFIG_FILE: &str = ".unseal.toml";

/// Prefix for environment variables that override config file values.
pub const ENV_PREFIX: &str = "UNSEAL_";

/// Opening marker of a secret reference.
pub const REFERENCE_PREFIX: &str = "ENC[";

/// Closing marker of a secret reference.
pub const REFERENCE_SUFFIX: &str = "]";

/// Protocol version sent to the backend in every request.
pub const PAYLOAD_VERSION: &str = "1.0";

/// Default backend timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default cap on captured backend stdout (1 MiB).
pub const DEFAULT_OUTPUT_MAX_SIZE: usize = 1024 * 1024;

/// Cap on captured backend stderr, only kept for error messages.
pub const STDERR_MAX_SIZE: usize = 4096;

/// How often the runner checks on a running backend.
pub const POLL_INTERVAL_MS: u64 = 10;
