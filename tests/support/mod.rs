//! Test support utilities for unseal integration tests.
//!
//! Provides an isolated working directory with helpers to write documents,
//! config files, and fake secret backends.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Name of the file fake backends append their requests to.
const REQUEST_LOG: &str = "requests.log";

/// Test environment with an isolated temp directory.
///
/// Child processes use `.current_dir()` so tests can run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a test environment whose backend answers with `response`.
    pub fn with_backend(response: &str) -> Self {
        let t = Self::new();
        let backend = t.responding_backend(response);
        t.write_config(&backend, "");
        t
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file into the test directory.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Write an executable backend script with the given shell body.
    ///
    /// The backend runs with an empty environment, so bodies should call
    /// external tools by absolute path.
    pub fn backend(&self, name: &str, body: &str) -> PathBuf {
        let path = self.write(name, &format!("#!/bin/sh\n{}\n", body));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o700))
                .expect("failed to chmod backend");
        }
        path
    }

    /// Backend that logs each request on its own line and replies with `response`.
    pub fn responding_backend(&self, response: &str) -> PathBuf {
        let log = self.path(REQUEST_LOG);
        let body = format!(
            "/bin/cat >> \"{log}\"\nprintf '\\n' >> \"{log}\"\n/bin/cat <<'UNSEAL_EOF'\n{response}\nUNSEAL_EOF",
            log = log.display(),
            response = response,
        );
        self.backend("backend.sh", &body)
    }

    /// Write `.unseal.toml` pointing at `backend`, plus any extra TOML lines.
    pub fn write_config(&self, backend: &Path, extra: &str) -> PathBuf {
        self.write(
            ".unseal.toml",
            &format!(
                "secret_backend_command = \"{}\"\n{}",
                backend.display(),
                extra
            ),
        )
    }

    /// Requests received by the responding backend, one per invocation.
    pub fn requests(&self) -> Vec<String> {
        fs::read_to_string(self.path(REQUEST_LOG))
            .unwrap_or_default()
            .lines()
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }
}
