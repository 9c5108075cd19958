//! Bulk teardown of provisioned resources
//!
//! Kinds are cleared children first (see [`ResourceKind::TEARDOWN_ORDER`]),
//! one destroy command per identifier, followed by an orphan sweep.
//!
//! A failed destroy is recorded and the sweep moves on to the next
//! identifier; the collected failures are returned together at the end as
//! [`PipelineError::TeardownPartialFailure`]. A failing list command or
//! orphan sweep stops the teardown immediately.

use crate::executor::CommandRunner;
use crate::infrastructure::{PulpCli, parse_identifiers};
use crate::pipeline::{DestroyFailure, PipelineError, ResourceKind};

/// Outcome of clearing one resource kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    /// Kind that was cleared
    pub kind: ResourceKind,
    /// Identifiers destroyed successfully
    pub destroyed: Vec<String>,
    /// Destroys that failed
    pub failures: Vec<DestroyFailure>,
}

impl KindReport {
    /// Number of identifiers the list command returned
    #[must_use]
    pub fn found(&self) -> usize {
        self.destroyed.len() + self.failures.len()
    }
}

/// Outcome of a full teardown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Per-kind results in teardown order
    pub kinds: Vec<KindReport>,
    /// Output of the orphan sweep
    pub orphans: String,
}

impl TeardownReport {
    /// Total resources destroyed
    #[must_use]
    pub fn destroyed_count(&self) -> usize {
        self.kinds.iter().map(|kind| kind.destroyed.len()).sum()
    }

    /// Every failed destroy, in issue order
    #[must_use]
    pub fn failures(&self) -> Vec<DestroyFailure> {
        self.kinds
            .iter()
            .flat_map(|kind| kind.failures.iter().cloned())
            .collect()
    }
}

/// Lists and destroys resources through the tool
pub struct Teardown<'a> {
    runner: &'a dyn CommandRunner,
    cli: &'a PulpCli,
}

impl<'a> Teardown<'a> {
    /// Creates a teardown driving `runner`
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, cli: &'a PulpCli) -> Self {
        Self { runner, cli }
    }

    /// Identifiers of every existing resource of `kind`
    ///
    /// # Errors
    ///
    /// Propagates the list command's failure; `UnexpectedOutput` when the
    /// output is JSON but not a list.
    pub fn list(&self, kind: ResourceKind) -> Result<Vec<String>, PipelineError> {
        let command = self.cli.list(kind);
        let output = self.runner.run(&command)?;
        parse_identifiers(&command, &output.stdout, kind.identifier_field())
    }

    /// Destroys every resource of `kind`
    ///
    /// An empty list issues no destroy commands.
    ///
    /// # Errors
    ///
    /// Only when listing fails; destroy failures land in the report.
    pub fn destroy_kind(&self, kind: ResourceKind) -> Result<KindReport, PipelineError> {
        let identifiers = self.list(kind)?;
        let mut report = KindReport {
            kind,
            destroyed: Vec::with_capacity(identifiers.len()),
            failures: Vec::new(),
        };

        for identifier in identifiers {
            match self.runner.run(&self.cli.destroy(kind, &identifier)) {
                Ok(_) => {
                    tracing::debug!(kind = %kind, identifier = %identifier, "Destroyed");
                    report.destroyed.push(identifier);
                }
                Err(e) => {
                    tracing::warn!(
                        kind = %kind,
                        identifier = %identifier,
                        error = %e,
                        "Destroy failed, continuing"
                    );
                    report.failures.push(DestroyFailure {
                        kind,
                        identifier,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Clears every kind in teardown order, then sweeps orphans
    ///
    /// # Errors
    ///
    /// `TeardownPartialFailure` when any destroy failed (after the sweep has
    /// still run); list and sweep failures propagate directly.
    pub fn destroy_existing(&self) -> Result<TeardownReport, PipelineError> {
        let mut report = TeardownReport::default();

        for kind in ResourceKind::TEARDOWN_ORDER {
            tracing::info!(kind = %kind, "Removing {kind}s");
            report.kinds.push(self.destroy_kind(kind)?);
        }

        tracing::info!("Removing orphaned content and artifacts");
        report.orphans = self.runner.run(&self.cli.orphan_cleanup)?.stdout;

        let failures = report.failures();
        if !failures.is_empty() {
            return Err(PipelineError::TeardownPartialFailure { failures });
        }

        tracing::info!(destroyed = report.destroyed_count(), "Teardown complete");
        Ok(report)
    }
}
