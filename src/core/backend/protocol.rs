//! Backend request/response protocol.
//!
//! Request on stdin:
//!
//! ```json
//! {"version": "1.0", "secrets": ["db_pass", "api_key"]}
//! ```
//!
//! Response on stdout, one entry per requested handle:
//!
//! ```json
//! {"db_pass": {"value": "s3cr3t", "error": ""}}
//! ```
//!
//! A non-empty `error` marks that handle as failed even when the process
//! exits successfully.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::{CommandRunner, SecretFetcher, SecretMap};
use crate::core::constants::PAYLOAD_VERSION;
use crate::error::{BackendError, Result};

/// Payload written to the backend's stdin.
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    pub version: &'static str,
    pub secrets: &'a [String],
}

impl<'a> Request<'a> {
    pub fn new(secrets: &'a [String]) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            secrets,
        }
    }
}

/// Backend answer for a single handle.
///
/// Capitalised field names (`Value`, `Error`) are accepted as well.
#[derive(Deserialize)]
pub struct SecretResponse {
    #[serde(default, alias = "Value")]
    pub value: Option<String>,
    #[serde(default, alias = "Error")]
    pub error: Option<String>,
}

impl std::fmt::Debug for SecretResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretResponse")
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .field("error", &self.error)
            .finish()
    }
}

/// [`SecretFetcher`] that speaks the JSON protocol through a [`CommandRunner`].
#[derive(Debug)]
pub struct Client<R> {
    runner: R,
}

impl<R: CommandRunner> Client<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> SecretFetcher for Client<R> {
    fn fetch(&self, handles: &[String]) -> Result<SecretMap> {
        let payload = serde_json::to_vec(&Request::new(handles)).map_err(BackendError::Request)?;
        debug!(handles = handles.len(), "fetching secrets from backend");

        let output = self.runner.run(&payload)?;
        let mut responses: HashMap<String, SecretResponse> =
            serde_json::from_slice(&output).map_err(BackendError::Protocol)?;

        let mut resolved = SecretMap::with_capacity(handles.len());
        for handle in handles {
            let response = responses
                .remove(handle)
                .ok_or_else(|| BackendError::MissingHandle(handle.clone()))?;

            if let Some(message) = response.error.filter(|m| !m.is_empty()) {
                return Err(BackendError::Rejected {
                    handle: handle.clone(),
                    message,
                }
                .into());
            }

            let value = Zeroizing::new(response.value.unwrap_or_default());
            if value.is_empty() {
                return Err(BackendError::EmptySecret(handle.clone()).into());
            }
            resolved.insert(handle.clone(), value);
        }

        debug!(resolved = resolved.len(), "backend resolved secrets");
        Ok(resolved)
    }

    fn is_configured(&self) -> bool {
        self.runner.is_configured()
    }
}
