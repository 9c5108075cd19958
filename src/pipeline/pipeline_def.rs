//! Pipeline definition and builder

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use crate::executor::CommandRunner;
use crate::infrastructure::PulpCli;
use crate::pipeline::context::{Context, ContextKey};
use crate::pipeline::errors::{PipelineError, ValidationError};
use crate::pipeline::steps::{
    CreateDistribution, CreatePublication, CreateRemote, CreateRepository, Step, SyncRepository,
};
use crate::pipeline::types::Validate;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

/// Fields every provisioning context starts with
pub const PROVISIONING_INPUTS: [ContextKey; 3] =
    [ContextKey::Name, ContextKey::Policy, ContextKey::Packages];

/// Ordered sequence of steps sharing one context
#[derive(Debug)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Fields the initial context is expected to hold
    pub provides: Vec<ContextKey>,

    /// Steps in execution order
    pub steps: Vec<Box<dyn Step>>,
}

/// Result of a completed pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Context after the last step
    pub context: Context,

    /// Primary value of the last step
    pub value: String,

    /// Names of the steps that ran, in order
    pub completed: Vec<&'static str>,
}

impl Validate for Pipeline {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.steps.is_empty() {
            return Err(ValidationError::EmptyPipeline);
        }

        let mut available: BTreeSet<ContextKey> = self.provides.iter().copied().collect();
        for step in &self.steps {
            if let Some(field) = step.reads().iter().find(|key| !available.contains(key)) {
                return Err(ValidationError::MissingContextField {
                    step: step.name().to_string(),
                    field: *field,
                });
            }
            available.extend(step.writes().iter().copied());
        }

        Ok(())
    }
}

impl Pipeline {
    /// Creates a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The five-step provisioning workflow
    ///
    /// Repository, remote, sync, publication, distribution.
    ///
    /// # Errors
    ///
    /// Only if the step declarations are inconsistent.
    pub fn provisioning(cli: &PulpCli) -> Result<Self, ValidationError> {
        Self::builder()
            .name("provision")
            .provides(PROVISIONING_INPUTS)
            .step(CreateRepository::new(cli.clone()))
            .step(CreateRemote::new(cli.clone()))
            .step(SyncRepository::new(cli.clone()))
            .step(CreatePublication::new(cli.clone()))
            .step(CreateDistribution::new(cli.clone()))
            .build()
    }

    /// Remote and repository only, for the staging smoke test
    ///
    /// # Errors
    ///
    /// Only if the step declarations are inconsistent.
    pub fn staging(cli: &PulpCli) -> Result<Self, ValidationError> {
        Self::builder()
            .name("staging")
            .provides(PROVISIONING_INPUTS)
            .step(CreateRemote::new(cli.clone()))
            .step(CreateRepository::new(cli.clone()))
            .build()
    }

    /// Returns number of steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Runs every step in order, threading `context` through them
    ///
    /// Errors from a step are returned as-is and no later step runs.
    ///
    /// # Errors
    ///
    /// The first error any step returns.
    pub fn execute(
        &self,
        runner: &dyn CommandRunner,
        context: Context,
    ) -> Result<PipelineOutcome, PipelineError> {
        let total = self.steps.len();
        let mut context = context;
        let mut value = String::new();
        let mut completed = Vec::with_capacity(total);

        for (index, step) in self.steps.iter().enumerate() {
            let position = index + 1;
            tracing::info!(
                pipeline = %self.name,
                step = step.name(),
                position,
                total,
                "Running step"
            );

            let start = Instant::now();
            let output = step.run(runner, context).inspect_err(|e| {
                tracing::error!(
                    pipeline = %self.name,
                    step = step.name(),
                    position,
                    total,
                    error = %e,
                    "Step failed, stopping pipeline"
                );
            })?;

            tracing::debug!(
                step = step.name(),
                duration_ms = start.elapsed().as_millis(),
                "Step completed"
            );

            context = output.context;
            value = output.value;
            completed.push(step.name());
        }

        Ok(PipelineOutcome {
            context,
            value,
            completed,
        })
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pipeline({}): {} steps", self.name, self.steps.len())
    }
}

/// Builder for creating pipelines
#[derive(Debug)]
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline {
                name: "unnamed".to_string(),
                provides: Vec::new(),
                steps: Vec::new(),
            },
        }
    }

    /// Sets pipeline name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.pipeline.name = name.into();
        self
    }

    /// Declares fields the initial context will hold
    pub fn provides(mut self, keys: impl IntoIterator<Item = ContextKey>) -> Self {
        self.pipeline.provides.extend(keys);
        self
    }

    /// Appends a step
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.pipeline.steps.push(Box::new(step));
        self
    }

    /// Builds pipeline, checking every step's reads against earlier writes
    #[allow(clippy::missing_errors_doc)]
    pub fn build(self) -> Result<Pipeline, ValidationError> {
        self.pipeline.validate()?;
        Ok(self.pipeline)
    }

    /// Builds pipeline without validation
    ///
    /// Missing fields then surface when the reading step runs.
    #[must_use]
    pub fn build_unchecked(self) -> Pipeline {
        self.pipeline
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
