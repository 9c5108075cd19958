//! Step types for pipeline execution
//!
//! This module defines the [`Step`] trait and the five steps of the
//! provisioning workflow.

use super::context::{Context, ContextKey};
use super::errors::PipelineError;
use crate::executor::CommandRunner;
use crate::infrastructure::{PulpCli, parse_href};

/// Result of running one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// Primary value of the step, usually the tool's output
    pub value: String,
    /// Context handed to the next step
    pub context: Context,
}

impl StepOutput {
    /// Creates a step output
    #[must_use]
    pub fn new(value: impl Into<String>, context: Context) -> Self {
        Self {
            value: value.into(),
            context,
        }
    }
}

/// A named unit of work in a pipeline
///
/// `reads` and `writes` declare the context fields the step consumes and
/// adds. [`PipelineBuilder::build`](super::PipelineBuilder::build) checks them
/// before anything runs.
#[allow(clippy::missing_errors_doc)]
pub trait Step: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Context fields this step reads
    fn reads(&self) -> &'static [ContextKey];

    /// Context fields this step adds
    fn writes(&self) -> &'static [ContextKey] {
        &[]
    }

    /// Runs the step against `context`
    fn run(&self, runner: &dyn CommandRunner, context: Context)
    -> Result<StepOutput, PipelineError>;
}

impl std::fmt::Debug for dyn Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name())
            .field("reads", &self.reads())
            .field("writes", &self.writes())
            .finish()
    }
}

/// Creates the repository named by `name`
#[derive(Debug, Clone)]
pub struct CreateRepository {
    cli: PulpCli,
}

impl CreateRepository {
    /// Creates the step
    #[must_use]
    pub fn new(cli: PulpCli) -> Self {
        Self { cli }
    }
}

impl Step for CreateRepository {
    fn name(&self) -> &'static str {
        "create_repository"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::Name]
    }

    fn run(
        &self,
        runner: &dyn CommandRunner,
        context: Context,
    ) -> Result<StepOutput, PipelineError> {
        let name = context.text(self.name(), ContextKey::Name)?;
        let output = runner.run(&self.cli.create_repository(name))?;
        Ok(StepOutput::new(output.stdout, context))
    }
}

/// Creates a remote fetching `packages` under `policy`
#[derive(Debug, Clone)]
pub struct CreateRemote {
    cli: PulpCli,
}

impl CreateRemote {
    /// Creates the step
    #[must_use]
    pub fn new(cli: PulpCli) -> Self {
        Self { cli }
    }
}

impl Step for CreateRemote {
    fn name(&self) -> &'static str {
        "create_remote"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::Name, ContextKey::Packages, ContextKey::Policy]
    }

    fn run(
        &self,
        runner: &dyn CommandRunner,
        context: Context,
    ) -> Result<StepOutput, PipelineError> {
        let name = context.text(self.name(), ContextKey::Name)?;
        let packages = context.list(self.name(), ContextKey::Packages)?;
        let policy = context.policy(self.name(), ContextKey::Policy)?;
        let output = runner.run(&self.cli.create_remote(name, packages, policy))?;
        Ok(StepOutput::new(output.stdout, context))
    }
}

/// Syncs the repository from the remote of the same name
#[derive(Debug, Clone)]
pub struct SyncRepository {
    cli: PulpCli,
}

impl SyncRepository {
    /// Creates the step
    #[must_use]
    pub fn new(cli: PulpCli) -> Self {
        Self { cli }
    }
}

impl Step for SyncRepository {
    fn name(&self) -> &'static str {
        "sync_repository"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::Name]
    }

    fn run(
        &self,
        runner: &dyn CommandRunner,
        context: Context,
    ) -> Result<StepOutput, PipelineError> {
        let name = context.text(self.name(), ContextKey::Name)?;
        let output = runner.run(&self.cli.sync_repository(name))?;
        Ok(StepOutput::new(output.stdout, context))
    }
}

/// Publishes the repository and records `publication_href`
#[derive(Debug, Clone)]
pub struct CreatePublication {
    cli: PulpCli,
}

impl CreatePublication {
    /// Creates the step
    #[must_use]
    pub fn new(cli: PulpCli) -> Self {
        Self { cli }
    }
}

impl Step for CreatePublication {
    fn name(&self) -> &'static str {
        "create_publication"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::Name]
    }

    fn writes(&self) -> &'static [ContextKey] {
        &[ContextKey::PublicationHref]
    }

    fn run(
        &self,
        runner: &dyn CommandRunner,
        context: Context,
    ) -> Result<StepOutput, PipelineError> {
        let command = self
            .cli
            .create_publication(context.text(self.name(), ContextKey::Name)?);
        let output = runner.run(&command)?;
        let href = parse_href(&output.stdout).ok_or(PipelineError::UnexpectedOutput {
            command,
            output: output.stdout,
        })?;

        tracing::debug!(publication_href = %href, "Publication created");
        let context = context.with(ContextKey::PublicationHref, href.clone());
        Ok(StepOutput::new(href, context))
    }
}

/// Serves the publication under a distribution named `name`
#[derive(Debug, Clone)]
pub struct CreateDistribution {
    cli: PulpCli,
}

impl CreateDistribution {
    /// Creates the step
    #[must_use]
    pub fn new(cli: PulpCli) -> Self {
        Self { cli }
    }
}

impl Step for CreateDistribution {
    fn name(&self) -> &'static str {
        "create_distribution"
    }

    fn reads(&self) -> &'static [ContextKey] {
        &[ContextKey::Name, ContextKey::PublicationHref]
    }

    fn run(
        &self,
        runner: &dyn CommandRunner,
        context: Context,
    ) -> Result<StepOutput, PipelineError> {
        let name = context.text(self.name(), ContextKey::Name)?;
        let href = context.text(self.name(), ContextKey::PublicationHref)?;
        let output = runner.run(&self.cli.create_distribution(name, href))?;
        Ok(StepOutput::new(output.stdout, context))
    }
}
