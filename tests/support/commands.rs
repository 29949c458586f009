//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create an unseal command running in the test directory.
    ///
    /// `UNSEAL_*` overrides from the outer environment are removed so the
    /// test's own config file is authoritative.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("unseal").expect("failed to find unseal binary");
        for key in [
            "UNSEAL_LOG",
            "UNSEAL_SECRET_BACKEND_COMMAND",
            "UNSEAL_SECRET_BACKEND_ARGUMENTS",
            "UNSEAL_SECRET_BACKEND_TIMEOUT",
            "UNSEAL_SECRET_BACKEND_OUTPUT_MAX_SIZE",
        ] {
            cmd.env_remove(key);
        }
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `unseal resolve <file>`.
    pub fn resolve(&self, file: &str) -> Output {
        self.cmd()
            .args(["resolve", file])
            .output()
            .expect("failed to run unseal resolve")
    }

    /// Shortcut for `unseal handles <file>`.
    pub fn handles(&self, file: &str) -> Output {
        self.cmd()
            .args(["handles", file])
            .output()
            .expect("failed to run unseal handles")
    }

    /// Shortcut for `unseal check`.
    pub fn check(&self) -> Output {
        self.cmd()
            .arg("check")
            .output()
            .expect("failed to run unseal check")
    }
}
