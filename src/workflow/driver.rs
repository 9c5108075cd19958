//! Top-level workflows
//!
//! - [`Workflow::reset_and_provision`]: teardown, store clear, then one
//!   provisioning pipeline per configured policy
//! - [`Workflow::smoke_test`]: stage a throwaway remote and repository and
//!   check them, tearing everything down if anything fails
//!
//! Everything runs sequentially; one policy's pipeline finishes before the
//! next starts.

use super::teardown::{Teardown, TeardownReport};
use crate::executor::CommandRunner;
use crate::infrastructure::{ClearReport, Config, RecordStore};
use crate::pipeline::{Context, ContextKey, Pipeline, PipelineError, PipelineOutcome, Policy, ResourceKind};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Result of a reset-and-provision run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// What teardown removed
    pub teardown: TeardownReport,
    /// What the store clear removed
    pub cleared: ClearReport,
    /// Pipeline outcome per policy, in run order
    pub provisioned: Vec<(Policy, PipelineOutcome)>,
}

impl ProvisionReport {
    /// Distribution name and publication href served per policy, in run order
    #[must_use]
    pub fn distributions(&self) -> Vec<(Policy, &str, &str)> {
        self.provisioned
            .iter()
            .filter_map(|(policy, outcome)| {
                let name = outcome.context.text("report", ContextKey::Name).ok()?;
                let href = outcome
                    .context
                    .text("report", ContextKey::PublicationHref)
                    .ok()?;
                Some((*policy, name, href))
            })
            .collect()
    }
}

/// Drives teardown and provisioning against one tool installation
pub struct Workflow<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a Config,
}

impl<'a> Workflow<'a> {
    /// Creates a workflow using `runner` for every command
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, config: &'a Config) -> Self {
        Self { runner, config }
    }

    /// Teardown bound to this workflow's runner and tool settings
    #[must_use]
    pub fn teardown(&self) -> Teardown<'a> {
        Teardown::new(self.runner, &self.config.cli)
    }

    /// Runs the provisioning pipeline once per entry, in policy order
    ///
    /// # Errors
    ///
    /// The first pipeline failure; later policies are not attempted.
    pub fn run_provisioning(
        &self,
        configurations: &BTreeMap<Policy, Vec<String>>,
    ) -> Result<Vec<(Policy, PipelineOutcome)>, PipelineError> {
        let pipeline = Pipeline::provisioning(&self.config.cli)?;
        let total = configurations.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, (policy, packages)) in configurations.iter().enumerate() {
            let name = self.config.resource_name(*policy);
            tracing::info!(
                policy = %policy,
                name = %name,
                position = index + 1,
                total,
                "Provisioning policy"
            );

            let context = Context::provisioning(name, *policy, packages.clone());
            let outcome = pipeline.execute(self.runner, context)?;
            outcomes.push((*policy, outcome));
        }

        Ok(outcomes)
    }

    /// Destroys everything, clears `store`, then provisions every configured policy
    ///
    /// # Errors
    ///
    /// Teardown errors abort before the store is touched; store and pipeline
    /// errors propagate as-is.
    pub fn reset_and_provision(
        &self,
        store: &dyn RecordStore,
    ) -> Result<ProvisionReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let _span = tracing::info_span!("reset", run_id = %run_id).entered();

        let teardown = self.teardown().destroy_existing()?;
        let cleared = store.clear()?;
        tracing::info!("{cleared}");
        let provisioned = self.run_provisioning(&self.config.policies)?;

        tracing::info!(policies = provisioned.len(), "Provisioning complete");
        Ok(ProvisionReport {
            teardown,
            cleared,
            provisioned,
        })
    }

    /// Stages the smoke test configuration and checks it
    ///
    /// On failure a full teardown runs before the original error is returned.
    /// On success the resources stay in place for inspection.
    ///
    /// # Errors
    ///
    /// Whatever failed first; teardown errors during recovery are only logged.
    pub fn smoke_test(&self) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        let _span = tracing::info_span!("smoke_test", run_id = %run_id).entered();

        let result = self.stage_and_check();
        if let Err(e) = &result {
            tracing::error!(error = %e, "Smoke test failed, tearing down");
            if let Err(teardown_error) = self.teardown().destroy_existing() {
                tracing::error!(error = %teardown_error, "Teardown after smoke test failure failed");
            }
        }
        result
    }

    fn stage_and_check(&self) -> Result<PipelineOutcome, PipelineError> {
        let smoke = &self.config.smoke_test;
        let pipeline = Pipeline::staging(&self.config.cli)?;
        let context = Context::provisioning(smoke.name.clone(), smoke.policy, smoke.packages.clone());

        let outcome = pipeline.execute(self.runner, context)?;
        self.check_staging(&smoke.name, smoke.policy, &smoke.packages)?;

        tracing::info!(name = %smoke.name, "Smoke test passed");
        Ok(outcome)
    }

    fn check_staging(
        &self,
        name: &str,
        policy: Policy,
        packages: &[String],
    ) -> Result<(), PipelineError> {
        let remote = self.show(ResourceKind::Remote, name)?;

        let staged_policy = remote.get("policy").and_then(serde_json::Value::as_str);
        if staged_policy != Some(policy.as_str()) {
            return Err(PipelineError::StagingCheck(format!(
                "remote '{name}' has policy {staged_policy:?}, expected '{policy}'"
            )));
        }

        let includes: Vec<&str> = remote
            .get("includes")
            .and_then(serde_json::Value::as_array)
            .map(|values| values.iter().filter_map(serde_json::Value::as_str).collect())
            .unwrap_or_default();
        if let Some(missing) = packages
            .iter()
            .find(|package| !includes.contains(&package.as_str()))
        {
            return Err(PipelineError::StagingCheck(format!(
                "remote '{name}' does not include package '{missing}'"
            )));
        }

        let repository = self.show(ResourceKind::Repository, name)?;
        if repository.get("name").and_then(serde_json::Value::as_str) != Some(name) {
            return Err(PipelineError::StagingCheck(format!(
                "repository '{name}' was not staged"
            )));
        }

        Ok(())
    }

    fn show(&self, kind: ResourceKind, name: &str) -> Result<serde_json::Value, PipelineError> {
        let command = self.config.cli.show(kind, name);
        let output = self.runner.run(&command)?;
        serde_json::from_str(&output.stdout).map_err(|_| PipelineError::UnexpectedOutput {
            command,
            output: output.stdout,
        })
    }
}
