//! Shell execution module
//!
//! [`ShellRunner`] hands each command line to a shell (`bash -c` by default)
//! with the tool directory prepended to `PATH`:
//!
//! - stdout is the primary output and is returned to the caller
//! - stderr is kept apart as the diagnostic buffer
//! - both are echoed through `tracing` after the process exits when the
//!   process-wide verbosity flag is set
//!
//! ```rust,no_run
//! use pulp_provision::{CommandRunner, ShellConfig, ShellRunner};
//!
//! let runner = ShellRunner::new(ShellConfig::default());
//! let output = runner.run("pulp status | jq -r .versions[0].version").unwrap();
//! println!("{}", output.trimmed());
//! ```

use super::traits::{CommandOutput, CommandRunner};
use crate::pipeline::{PipelineError, ValidationError};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Directory holding the `pulp` binaries on a standard install
pub const DEFAULT_TOOL_PATH: &str = "/opt/pulp/bin";

static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Turns echoing of captured command output on or off
///
/// Only affects what is logged, never what a command returns.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Returns true if captured command output is echoed
#[must_use]
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Shell execution configuration
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Shell to use (default: bash)
    pub shell: String,

    /// Directory prepended to the inherited `PATH`
    pub tool_path: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
            tool_path: PathBuf::from(DEFAULT_TOOL_PATH),
        }
    }
}

impl ShellConfig {
    /// Builds the `PATH` handed to child processes
    ///
    /// # Errors
    ///
    /// `Validation` if `tool_path` contains the platform's path separator.
    pub fn search_path(&self) -> Result<OsString, PipelineError> {
        self.search_path_from(&std::env::var_os("PATH").unwrap_or_default())
    }

    fn search_path_from(&self, inherited: &OsStr) -> Result<OsString, PipelineError> {
        // empty entries mean the working directory on POSIX
        let paths = std::iter::once(self.tool_path.clone())
            .chain(std::env::split_paths(inherited))
            .filter(|path| !path.as_os_str().is_empty());
        std::env::join_paths(paths).map_err(|_| {
            ValidationError::InvalidToolPath {
                path: self.tool_path.display().to_string(),
            }
            .into()
        })
    }
}

/// Runs command lines through a local shell
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    config: ShellConfig,
}

impl ShellRunner {
    /// Creates a runner with the given configuration
    #[must_use]
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }

    /// Returns the runner's configuration
    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command_line: &str) -> Result<CommandOutput, PipelineError> {
        tracing::debug!(command = %command_line, "Executing shell command");

        let start = Instant::now();
        let output = Command::new(&self.config.shell)
            .arg("-c")
            .arg(command_line)
            .env("PATH", self.config.search_path()?)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| PipelineError::Io(format!("failed to spawn {}: {e}", self.config.shell)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code().unwrap_or(-1);
        let duration = start.elapsed();

        if exit_code != 0 {
            tracing::error!(
                command = %command_line,
                exit_code,
                stdout = %stdout.trim_end(),
                stderr = %diagnostics.trim_end(),
                "Command failed"
            );
            return Err(PipelineError::CommandFailed {
                command: command_line.to_string(),
                code: exit_code,
                stdout,
                stderr: diagnostics,
            });
        }

        if is_verbose() {
            echo(command_line, &stdout, &diagnostics);
        }

        tracing::debug!(
            command = %command_line,
            duration_ms = duration.as_millis(),
            "Command completed"
        );

        Ok(CommandOutput {
            stdout,
            diagnostics,
            exit_code,
            duration,
        })
    }
}

fn echo(command_line: &str, stdout: &str, diagnostics: &str) {
    if !stdout.trim().is_empty() {
        tracing::info!(command = %command_line, "Command output\n{}", stdout.trim_end());
    }
    if !diagnostics.trim().is_empty() {
        tracing::info!(command = %command_line, "Diagnostic output\n{}", diagnostics.trim_end());
    }
}
