//! Custom assertion macros for CLI and scenario tests.
//!
//! These macros provide descriptive failure messages to aid debugging.

use std::path::Path;

/// List all files in a directory recursively (for debugging)
pub fn list_all_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(list_all_files(&path));
            } else {
                files.push(path.display().to_string());
            }
        }
    }
    files
}

/// Assert that a file exists on the (local) host.
///
/// # Example
/// ```ignore
/// assert_on_host!(env, "automations.yaml");
/// ```
#[macro_export]
macro_rules! assert_on_host {
    ($env:expr, $path:expr) => {
        let full_path = $env.host_path($path);
        assert!(
            full_path.exists(),
            "Expected '{}' on the host, but it doesn't exist.\nHost files:\n  {}",
            $path,
            $crate::common::list_all_files(&$env.host_path("")).join("\n  ")
        );
    };
}

/// Assert that a file does NOT exist on the host.
#[macro_export]
macro_rules! assert_not_on_host {
    ($env:expr, $path:expr) => {
        let full_path = $env.host_path($path);
        assert!(
            !full_path.exists(),
            "Expected '{}' to NOT exist on the host, but it does.",
            $path
        );
    };
}

/// Assert that command output contains a substring.
#[macro_export]
macro_rules! assert_output_contains {
    ($result:expr, $needle:expr) => {
        let output = $result.combined_output();
        assert!(
            output.contains($needle),
            "Expected output to contain '{}'.\nstdout:\n{}\nstderr:\n{}",
            $needle,
            $result.stdout,
            $result.stderr
        );
    };
}

/// Assert an exit code, printing both streams on mismatch.
#[macro_export]
macro_rules! assert_exit_code {
    ($result:expr, $code:expr) => {
        assert_eq!(
            $result.exit_code, $code,
            "unexpected exit code.\nstdout:\n{}\nstderr:\n{}",
            $result.stdout, $result.stderr
        );
    };
}
