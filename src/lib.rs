//! # pulp-provision - Seed and reset a Pulp Python content server
//!
//! Drives the `pulp` command-line tool to bring a server to a known state:
//! every distribution, publication, repository and remote is destroyed,
//! the content store is cleared, and one repository per download policy is
//! provisioned through a fixed pipeline of steps.
//!
//! ## Layers
//!
//! - [`executor`]: runs command lines and captures their output
//! - [`pipeline`]: typed context, steps and the pipeline that chains them
//! - [`workflow`]: teardown, reset-and-provision and the smoke test
//! - [`infrastructure`]: configuration, logging, tool command building and
//!   the record store
//!
//! ## Example
//!
//! ```no_run
//! use pulp_provision::{CommandRecordStore, Config, ShellRunner, Workflow};
//!
//! let config = Config::load(None)?;
//! let runner = ShellRunner::new(config.shell_config());
//! let store = CommandRecordStore::new(&runner, &config.store);
//!
//! let report = Workflow::new(&runner, &config).reset_and_provision(&store)?;
//! println!("provisioned {} policies", report.provisioned.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod executor;
pub mod infrastructure;
pub mod pipeline;
pub mod workflow;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use executor::{
    CommandOutput, CommandRunner, DEFAULT_TOOL_PATH, ShellConfig, ShellRunner, is_verbose,
    set_verbose,
};
pub use infrastructure::{
    ClearReport, CommandRecordStore, Config, ConfigError, PulpCli, RecordStore, SmokeTestConfig,
    StoreCommands, init_logging,
};
pub use pipeline::{
    Context, ContextKey, ContextValue, DestroyFailure, Pipeline, PipelineBuilder, PipelineError,
    PipelineOutcome, Policy, ResourceKind, Step, StepOutput, Validate, ValidationError,
};
pub use workflow::{KindReport, ProvisionReport, Teardown, TeardownReport, Workflow};

/// Version of the pulp-provision crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
