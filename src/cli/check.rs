//! Check command - inspect the backend configuration.
//!
//! Reports the effective settings and verifies the backend executable can
//! be located and passes the rights check, without running it.

use std::path::Path;

use crate::cli::output;
use crate::core::backend::Process;
use crate::core::config::Config;
use crate::error::{ConfigError, Result};

pub fn execute(config: Option<&Path>) -> Result<()> {
    let config = Config::load(config)?;

    output::header("Secret backend");
    if !config.is_enabled() {
        output::kv("command", "(none)");
        output::warn("secret resolution is disabled");
        return Err(ConfigError::NoBackendCommand.into());
    }

    output::kv("command", &config.secret_backend_command);
    if !config.secret_backend_arguments.is_empty() {
        output::kv("arguments", config.secret_backend_arguments.join(" "));
    }
    output::kv("timeout", format!("{}s", config.secret_backend_timeout));
    output::kv(
        "output limit",
        format!("{} bytes", config.secret_backend_output_max_size),
    );

    let path = Process::from_config(&config).executable()?;
    output::kv("path", path.display());
    output::success("backend executable passes the rights check");
    Ok(())
}
