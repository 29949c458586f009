//! Unseal - resolve ENC[...] secret handles in configuration documents.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unseal::cli::output;
use unseal::cli::{execute, Cli};
use unseal::error::{BackendError, ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("UNSEAL_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("unseal=debug")
        } else {
            EnvFilter::new("unseal=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.config.as_deref()) {
        let suggestion = match &e {
            Error::Config(ConfigError::NoBackendCommand) => {
                Some("set secret_backend_command in .unseal.toml")
            }
            Error::Backend(BackendError::Permission { .. }) => {
                Some("the backend must be owned by you with no rights for others: chmod 700")
            }
            Error::Backend(BackendError::Timeout { .. }) => Some("raise secret_backend_timeout"),
            Error::Backend(BackendError::OutputTooLarge { .. }) => {
                Some("raise secret_backend_output_max_size")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
