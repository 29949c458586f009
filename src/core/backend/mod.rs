//! Secret backend access.
//!
//! The backend is an external executable speaking a small JSON protocol over
//! stdin/stdout. Two seams keep it swappable:
//!
//! - [`CommandRunner`] executes the backend with a request payload and
//!   returns its raw output ([`Process`] is the real implementation).
//! - [`SecretFetcher`] turns a batch of handles into plaintexts
//!   ([`Client`] implements it on top of any `CommandRunner`).
//!
//! Tests substitute either one with a deterministic fake.

use std::collections::HashMap;

use zeroize::Zeroizing;

use crate::error::Result;

mod limit;
mod process;
mod protocol;
mod rights;

pub use limit::{capture, capture_truncated, Capture, LimitBuffer};
pub use process::Process;
pub use protocol::{Client, Request, SecretResponse};
pub use rights::check_rights;

/// Plaintexts returned by a fetch, keyed by handle.
pub type SecretMap = HashMap<String, Zeroizing<String>>;

/// Executes the backend command.
pub trait CommandRunner {
    /// Run the backend with `payload` on stdin and return its stdout.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on permission, timeout, size, or execution
    /// failures, and `ConfigError::NoBackendCommand` if nothing is configured.
    fn run(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Whether a backend command is configured at all.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Resolves a batch of handles in one round trip.
pub trait SecretFetcher {
    /// Fetch plaintexts for every handle in `handles`.
    ///
    /// Either every handle is resolved or an error is returned; partial
    /// results are never handed back.
    fn fetch(&self, handles: &[String]) -> Result<SecretMap>;

    /// Whether resolution is enabled. When `false` documents pass through
    /// untouched.
    fn is_configured(&self) -> bool {
        true
    }
}

impl<T: SecretFetcher + ?Sized> SecretFetcher for &T {
    fn fetch(&self, handles: &[String]) -> Result<SecretMap> {
        (**self).fetch(handles)
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}
