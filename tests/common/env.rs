//! Test environment builder for isolated hapsync testing.
//!
//! Provides `TestEnv` - a temp project whose `hapsync.toml` points the host
//! at a local directory, plus helpers to run the hapsync binary in it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

use super::fixtures::LOCAL_HOST_CONFIG;

/// Result of running a hapsync CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as NDJSON, one value per non-empty line
    pub fn json_events(&self) -> Vec<Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .unwrap_or_else(|e| panic!("not JSON: {} ({})\nstdout:\n{}", l, e, self.stdout))
            })
            .collect()
    }
}

/// Isolated test environment.
///
/// Layout inside `project_root`:
/// - `hapsync.toml`
/// - `config/` the configuration tree
/// - `host/` the "remote" host, reached through the local transport
pub struct TestEnv {
    pub project_root: TempDir,
    pub home_dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn tree_path(&self, relative: &str) -> PathBuf {
        self.project_path("config").join(relative)
    }

    pub fn host_path(&self, relative: &str) -> PathBuf {
        self.project_path("host").join(relative)
    }

    pub fn write_tree_file(&self, relative: &str, content: &str) {
        write_file(&self.tree_path(relative), content);
    }

    pub fn remove_tree_file(&self, relative: &str) {
        fs::remove_file(self.tree_path(relative)).expect("remove tree file");
    }

    pub fn write_host_file(&self, relative: &str, content: &str) {
        write_file(&self.host_path(relative), content);
    }

    pub fn read_host_file(&self, relative: &str) -> String {
        fs::read_to_string(self.host_path(relative)).unwrap_or_default()
    }

    /// Audit log lines as JSON
    pub fn audit_records(&self) -> Vec<Value> {
        fs::read_to_string(self.project_path(".hapsync/deployments.jsonl"))
            .unwrap_or_default()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("audit line is JSON"))
            .collect()
    }

    /// Run hapsync from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("HAPSYNC_CONFIG")
            .env_remove("HAPSYNC_HOST")
            .env_remove("HAPSYNC_HOST_PATH")
            .env_remove("HAPSYNC_HOST_CHECK")
            .env_remove("HAPSYNC_RELOAD")
            .env_remove("HAPSYNC_UNKNOWN_KEYS")
            .env_remove("HAPSYNC_AUDIT_PATH");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute hapsync");
        output_to_result(output)
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write file");
}

pub struct TestEnvBuilder {
    config: String,
    tree: Vec<(String, String)>,
    host: Vec<(String, String)>,
}

impl TestEnvBuilder {
    pub fn new() -> Self {
        Self {
            config: LOCAL_HOST_CONFIG.to_string(),
            tree: Vec::new(),
            host: Vec::new(),
        }
    }

    /// Replace the whole `hapsync.toml`
    pub fn with_config(mut self, toml: &str) -> Self {
        self.config = toml.to_string();
        self
    }

    /// Append sections to the default `hapsync.toml`
    pub fn with_extra_config(mut self, toml: &str) -> Self {
        self.config.push('\n');
        self.config.push_str(toml);
        self
    }

    pub fn with_tree_file(mut self, path: &str, content: &str) -> Self {
        self.tree.push((path.to_string(), content.to_string()));
        self
    }

    pub fn with_tree(mut self, files: &[(&str, &str)]) -> Self {
        for (path, content) in files {
            self = self.with_tree_file(path, content);
        }
        self
    }

    pub fn with_host_file(mut self, path: &str, content: &str) -> Self {
        self.host.push((path.to_string(), content.to_string()));
        self
    }

    pub fn build(self) -> TestEnv {
        let env = TestEnv {
            project_root: TempDir::new().expect("project tempdir"),
            home_dir: TempDir::new().expect("home tempdir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_hapsync")),
        };
        write_file(&env.project_path("hapsync.toml"), &self.config);
        fs::create_dir_all(env.tree_path("")).expect("tree dir");
        fs::create_dir_all(env.host_path("")).expect("host dir");
        for (path, content) in &self.tree {
            env.write_tree_file(path, content);
        }
        for (path, content) in &self.host {
            env.write_host_file(path, content);
        }
        env
    }
}

impl Default for TestEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
