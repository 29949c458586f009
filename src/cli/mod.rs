//! Command-line interface.

pub mod check;
pub mod handles;
pub mod output;
pub mod resolve;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::error::Result;

/// Unseal - resolve ENC[...] secret handles in configuration documents.
#[derive(Parser)]
#[command(
    name = "unseal",
    about = "Resolve ENC[...] secret handles in configuration documents",
    version
)]
pub struct Cli {
    /// Config file (defaults to .unseal.toml in the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Resolve every secret reference in a document
    Resolve {
        /// Document to read (stdin if omitted)
        file: Option<PathBuf>,
        /// Write the resolved document here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// List the secret handles a document references
    Handles {
        /// Document to read (stdin if omitted)
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the backend configuration and executable
    Check,
}

/// Execute a command.
pub fn execute(command: Command, config: Option<&Path>) -> Result<()> {
    use Command::*;

    match command {
        Resolve { file, output } => resolve::execute(file.as_deref(), output.as_deref(), config),
        Handles { file, json } => handles::execute(file.as_deref(), json),
        Check => check::execute(config),
    }
}

/// Read a document from `file`, or from stdin when `None` or `-`.
pub(crate) fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) if path != Path::new("-") => Ok(std::fs::read(path)?),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}
