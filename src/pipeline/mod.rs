//! Pipeline domain types and logic

pub mod context;
pub mod errors;
pub mod pipeline_def;
pub mod steps;
pub mod types;

#[cfg(test)]
mod types_tests;

pub use context::{Context, ContextKey, ContextValue};
pub use errors::{DestroyFailure, PipelineError, ValidationError};
pub use pipeline_def::{PROVISIONING_INPUTS, Pipeline, PipelineBuilder, PipelineOutcome};
pub use steps::{
    CreateDistribution, CreatePublication, CreateRemote, CreateRepository, Step, StepOutput,
    SyncRepository,
};
pub use types::{Policy, ResourceKind, Validate};
