//! Prelude module for common imports

// Re-export all pipeline types with full paths
pub use crate::pipeline::context::{Context, ContextKey, ContextValue};
pub use crate::pipeline::errors::{DestroyFailure, PipelineError, ValidationError};
pub use crate::pipeline::pipeline_def::{Pipeline, PipelineBuilder, PipelineOutcome};
pub use crate::pipeline::steps::{Step, StepOutput};
pub use crate::pipeline::types::{Policy, ResourceKind, Validate};

// Re-export executor types
pub use crate::executor::{CommandOutput, CommandRunner, ShellConfig, ShellRunner};

// Re-export workflow types
pub use crate::infrastructure::{Config, RecordStore};
pub use crate::workflow::{Teardown, Workflow};
