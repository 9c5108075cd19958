//! Command execution traits
//!
//! Everything that talks to the external tool goes through [`CommandRunner`],
//! so the pipeline, teardown and driver can run against a scripted runner.

use crate::pipeline::PipelineError;
use std::time::Duration;

/// Runs whole shell command lines
#[allow(clippy::missing_errors_doc)]
pub trait CommandRunner: Send + Sync {
    /// Executes `command_line` and returns its captured output
    ///
    /// A non-zero exit status is reported as `PipelineError::CommandFailed`.
    fn run(&self, command_line: &str) -> Result<CommandOutput, PipelineError>;
}

/// Result of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, the value callers parse
    pub stdout: String,

    /// Standard error, kept for operator visibility only
    pub diagnostics: String,

    /// Exit code
    pub exit_code: i32,

    /// Duration of execution
    pub duration: Duration,
}

impl CommandOutput {
    /// Creates an output holding only `stdout`
    #[must_use]
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// Returns true if command succeeded (exit code 0)
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Standard output with surrounding whitespace removed
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}
