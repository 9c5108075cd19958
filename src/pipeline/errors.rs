//! Error types for pipeline domain

use super::context::ContextKey;
use super::types::ResourceKind;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during pipeline operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Validation failed with specified reason
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Command execution failed
    #[error("Command `{command}` failed with exit code {code}: {stderr}")]
    CommandFailed {
        /// Command line handed to the shell.
        command: String,
        /// Exit code returned by the command.
        code: i32,
        /// Standard output captured before the failure.
        stdout: String,
        /// Standard error output from the command.
        stderr: String,
    },

    /// A step ran without a context field it requires
    #[error("Step '{step}' requires context field '{field}' which has not been set")]
    MissingContextField {
        /// Name of the step that read the field.
        step: String,
        /// The missing field.
        field: ContextKey,
    },

    /// A context field holds a value of the wrong shape
    #[error("Step '{step}' expected context field '{field}' to be {expected}")]
    ContextFieldType {
        /// Name of the step that read the field.
        step: String,
        /// The offending field.
        field: ContextKey,
        /// Description of the expected value.
        expected: &'static str,
    },

    /// One or more per-identifier destroys failed during teardown
    #[error("Teardown finished with {} failed destroy(s): {}", .failures.len(), DisplayFailures(.failures))]
    TeardownPartialFailure {
        /// Every destroy that failed, in issue order.
        failures: Vec<DestroyFailure>,
    },

    /// Tool output could not be interpreted
    #[error("Unexpected output from `{command}`: {output:?}")]
    UnexpectedOutput {
        /// Command line that produced the output.
        command: String,
        /// The raw output.
        output: String,
    },

    /// The smoke test's staging check rejected the provisioned resources
    #[error("Staging check failed: {0}")]
    StagingCheck(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// A single destroy that failed during teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyFailure {
    /// Kind of the resource.
    pub kind: ResourceKind,
    /// Name or href of the resource.
    pub identifier: String,
    /// Error reported by the destroy command.
    pub message: String,
}

impl fmt::Display for DestroyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' ({})", self.kind, self.identifier, self.message)
    }
}

struct DisplayFailures<'a>(&'a [DestroyFailure]);

impl fmt::Display for DisplayFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// Validation errors for pipeline components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name cannot be empty
    #[error("Name cannot be empty")]
    EmptyName,

    /// Invalid characters in name
    #[error("Invalid characters in name: '{name}'")]
    InvalidNameChars {
        /// The invalid name.
        name: String,
    },

    /// Pipeline must have at least one step
    #[error("Pipeline must have at least one step")]
    EmptyPipeline,

    /// A step reads a field that nothing before it provides
    #[error("Step '{step}' reads context field '{field}' but no earlier step writes it")]
    MissingContextField {
        /// Name of the step.
        step: String,
        /// The unavailable field.
        field: ContextKey,
    },

    /// A policy was configured without packages, or with a blank one
    #[error("Policy '{policy}' must list at least one package and no blank names")]
    EmptyPackages {
        /// The policy, rendered.
        policy: String,
    },

    /// Tool directory cannot be joined into `PATH`
    #[error("Tool path '{path}' contains the path separator")]
    InvalidToolPath {
        /// The rejected directory.
        path: String,
    },

    /// Remote URL could not be parsed
    #[error("Invalid remote URL '{url}': {reason}")]
    InvalidRemoteUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        reason: String,
    },
}
