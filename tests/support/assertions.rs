//! Test assertion helpers.

use std::process::Output;

/// Assert that a command output was successful.
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("Command failed:\n{}", stderr);
    }
}

/// Assert that a command failed and its stderr mentions `needle`.
pub fn assert_failure_contains(output: &Output, needle: &str) {
    assert!(
        !output.status.success(),
        "Command unexpectedly succeeded:\n{}",
        stdout(output)
    );
    let err = stderr(output);
    assert!(err.contains(needle), "stderr missing {:?}:\n{}", needle, err);
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Parse YAML output for structural comparison.
pub fn yaml(text: &str) -> serde_yaml::Value {
    serde_yaml::from_str(text).expect("output is not valid YAML")
}
