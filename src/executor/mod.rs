//! Command execution layer
//!
//! This module contains the runner trait and the local shell implementation.

mod shell;
#[cfg(test)]
pub(crate) mod testing;
mod traits;

pub use shell::{DEFAULT_TOOL_PATH, ShellConfig, ShellRunner, is_verbose, set_verbose};
pub use traits::{CommandOutput, CommandRunner};
