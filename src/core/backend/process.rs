//! Subprocess execution of the secret backend.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::limit::{capture, capture_truncated, Capture};
use super::rights::check_rights;
use super::CommandRunner;
use crate::core::config::Config;
use crate::core::constants::{POLL_INTERVAL_MS, STDERR_MAX_SIZE};
use crate::error::{BackendError, ConfigError, Result};

/// Runs the configured backend as a time-bounded subprocess.
///
/// The child gets an empty environment, the request on stdin, and a stdout
/// pipe capped at `secret_backend_output_max_size` bytes.
#[derive(Debug, Clone)]
pub struct Process {
    command: String,
    arguments: Vec<String>,
    timeout: Duration,
    output_max_size: usize,
}

impl Process {
    pub fn new(
        command: impl Into<String>,
        arguments: Vec<String>,
        timeout: Duration,
        output_max_size: usize,
    ) -> Self {
        Self {
            command: command.into(),
            arguments,
            timeout,
            output_max_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.secret_backend_command.clone(),
            config.secret_backend_arguments.clone(),
            config.timeout(),
            config.secret_backend_output_max_size,
        )
    }

    /// Locate the backend executable and check that it is safe to run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoBackendCommand` if no command is set,
    /// `BackendError::Execution` if it cannot be found, and
    /// `BackendError::Permission` if the rights check fails.
    pub fn executable(&self) -> Result<PathBuf> {
        if self.command.is_empty() {
            return Err(ConfigError::NoBackendCommand.into());
        }
        let path = which::which(&self.command)
            .map_err(|e| self.execution_error(format!("cannot locate executable: {}", e)))?;
        check_rights(&path)?;
        Ok(path)
    }

    fn execution_error(&self, reason: impl Into<String>) -> BackendError {
        BackendError::Execution {
            command: self.command.clone(),
            reason: reason.into(),
        }
    }

    fn timeout_error(&self) -> BackendError {
        warn!(command = %self.command, "secret backend timed out");
        BackendError::Timeout {
            command: self.command.clone(),
            timeout: self.timeout,
        }
    }

    /// Kill and reap the child. Errors are ignored: it may already be gone.
    fn terminate(child: &mut Child) {
        let _ = child.kill();
        let _ = child.wait();
    }

    /// Wait for the child to exit and its stdout to be fully drained.
    ///
    /// Fails as soon as the deadline passes or stdout overflows; the caller
    /// is responsible for killing the child in that case.
    fn supervise(
        &self,
        child: &mut Child,
        stdout: &Receiver<Capture>,
    ) -> Result<(ExitStatus, Vec<u8>)> {
        let deadline = Instant::now() + self.timeout;
        let mut captured = None;

        let status = loop {
            if captured.is_none() {
                match stdout.try_recv() {
                    Ok(capture) => captured = Some(capture),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        return Err(self.execution_error("stdout reader stopped").into())
                    }
                }
            }
            if let Some(Capture::Overflow) = captured {
                return Err(BackendError::OutputTooLarge {
                    command: self.command.clone(),
                    limit: self.output_max_size,
                }
                .into());
            }
            if let Some(status) = child
                .try_wait()
                .map_err(|e| self.execution_error(e.to_string()))?
            {
                break status;
            }
            if Instant::now() >= deadline {
                return Err(self.timeout_error().into());
            }
            thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
        };

        // The pipe can outlive the child if it forked; the deadline still holds.
        let captured = match captured {
            Some(capture) => capture,
            None => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match stdout.recv_timeout(remaining) {
                    Ok(capture) => capture,
                    Err(RecvTimeoutError::Timeout) => return Err(self.timeout_error().into()),
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(self.execution_error("stdout reader stopped").into())
                    }
                }
            }
        };

        match captured {
            Capture::Complete(bytes) => Ok((status, bytes)),
            Capture::Overflow => Err(BackendError::OutputTooLarge {
                command: self.command.clone(),
                limit: self.output_max_size,
            }
            .into()),
            Capture::Failed(e) => {
                Err(self.execution_error(format!("failed to read output: {}", e)).into())
            }
        }
    }
}

impl CommandRunner for Process {
    fn run(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let path = self.executable()?;
        debug!(command = %path.display(), args = self.arguments.len(), "running secret backend");

        let mut child = Command::new(&path)
            .args(&self.arguments)
            // Credentials such as API keys set in our environment must not
            // be visible to the backend.
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.execution_error(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            let request = payload.to_vec();
            thread::spawn(move || {
                // A backend that exits without reading closes the pipe;
                // its exit status tells the real story.
                let _ = stdin.write_all(&request);
            });
        }

        let (tx, rx) = mpsc::channel();
        match child.stdout.take() {
            Some(out) => {
                let limit = self.output_max_size;
                thread::spawn(move || {
                    let _ = tx.send(capture(out, limit));
                });
            }
            None => {
                let _ = tx.send(Capture::Failed(io::Error::new(
                    io::ErrorKind::Other,
                    "stdout was not captured",
                )));
            }
        }
        let stderr = child
            .stderr
            .take()
            .map(|err| thread::spawn(move || capture_truncated(err, STDERR_MAX_SIZE)));

        let (status, output) = match self.supervise(&mut child, &rx) {
            Ok(done) => done,
            Err(e) => {
                Self::terminate(&mut child);
                return Err(e);
            }
        };

        if !status.success() {
            let stderr = stderr
                .and_then(|h| h.join().ok())
                .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
                .unwrap_or_default();
            let mut reason = format!("command {}", status);
            if !stderr.is_empty() {
                reason.push_str(": ");
                reason.push_str(&stderr);
            }
            return Err(self.execution_error(reason).into());
        }

        trace!(bytes = output.len(), "secret backend output captured");
        Ok(output)
    }

    fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}
