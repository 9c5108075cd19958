//! Persistent store clearing
//!
//! Removes content-artifact links, content records and scan results before a
//! fresh provisioning run. The default store runs one management command per
//! collection; each prints the number of rows it deleted.

use crate::executor::CommandRunner;
use crate::pipeline::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deleted row counts per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    /// Content-artifact links removed
    pub content_artifacts: u64,
    /// Content records removed
    pub contents: u64,
    /// Scan results removed
    pub scan_results: u64,
}

impl fmt::Display for ClearReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deleted: {} content artifacts, {} contents, {} scan results",
            self.content_artifacts, self.contents, self.scan_results
        )
    }
}

/// Bulk deletion over the store's record collections
#[allow(clippy::missing_errors_doc)]
pub trait RecordStore {
    /// Deletes every record in the three collections
    fn clear(&self) -> Result<ClearReport, PipelineError>;
}

/// Commands that delete one collection each and print the deleted count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCommands {
    /// Deletes content-artifact links
    pub content_artifacts: String,
    /// Deletes content records
    pub contents: String,
    /// Deletes scan results
    pub scan_results: String,
}

impl Default for StoreCommands {
    fn default() -> Self {
        Self {
            content_artifacts: manager_delete("ContentArtifact"),
            contents: manager_delete("Content"),
            scan_results: manager_delete("ScanResult"),
        }
    }
}

fn manager_delete(model: &str) -> String {
    let script = format!(
        "from pulpcore.app.models import {model}; print({model}.objects.all().delete()[0])"
    );
    format!("pulpcore-manager shell -c {}", shell_words::quote(&script))
}

/// Store cleared by running [`StoreCommands`] through a runner
pub struct CommandRecordStore<'a> {
    runner: &'a dyn CommandRunner,
    commands: &'a StoreCommands,
}

impl<'a> CommandRecordStore<'a> {
    /// Creates a store backed by `runner`
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, commands: &'a StoreCommands) -> Self {
        Self { runner, commands }
    }

    fn delete(&self, command: &str) -> Result<u64, PipelineError> {
        let output = self.runner.run(command)?;
        // management shells may print banners before the count
        output
            .stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .and_then(|line| line.parse().ok())
            .ok_or_else(|| PipelineError::UnexpectedOutput {
                command: command.to_string(),
                output: output.stdout.clone(),
            })
    }
}

impl RecordStore for CommandRecordStore<'_> {
    fn clear(&self) -> Result<ClearReport, PipelineError> {
        // links first, they reference content
        let report = ClearReport {
            content_artifacts: self.delete(&self.commands.content_artifacts)?,
            contents: self.delete(&self.commands.contents)?,
            scan_results: self.delete(&self.commands.scan_results)?,
        };
        tracing::info!(
            content_artifacts = report.content_artifacts,
            contents = report.contents,
            scan_results = report.scan_results,
            "Store cleared"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::ScriptedRunner;

    fn commands() -> StoreCommands {
        StoreCommands {
            content_artifacts: "delete-links".to_string(),
            contents: "delete-content".to_string(),
            scan_results: "delete-scans".to_string(),
        }
    }

    #[test]
    fn test_clear_reports_counts_in_order() {
        let runner = ScriptedRunner::new()
            .respond("delete-links", "12\n")
            .respond("delete-content", "banner line\n7\n")
            .respond("delete-scans", "0");
        let commands = commands();

        let report = CommandRecordStore::new(&runner, &commands).clear().unwrap();

        assert_eq!(
            report,
            ClearReport {
                content_artifacts: 12,
                contents: 7,
                scan_results: 0,
            }
        );
        assert_eq!(
            runner.calls(),
            vec!["delete-links", "delete-content", "delete-scans"]
        );
    }

    #[test]
    fn test_non_numeric_output_is_rejected() {
        let runner = ScriptedRunner::new().respond("delete-links", "Traceback ...");
        let commands = commands();

        let err = CommandRecordStore::new(&runner, &commands)
            .clear()
            .unwrap_err();

        assert!(matches!(err, PipelineError::UnexpectedOutput { .. }));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_default_commands_use_manager_shell() {
        let commands = StoreCommands::default();

        assert!(commands.content_artifacts.starts_with("pulpcore-manager shell -c '"));
        assert!(commands.contents.contains("Content.objects.all().delete()[0]"));
        assert!(commands.scan_results.contains("import ScanResult"));
    }

    #[test]
    fn test_report_display() {
        let report = ClearReport {
            content_artifacts: 1,
            contents: 2,
            scan_results: 3,
        };
        assert_eq!(
            report.to_string(),
            "Deleted: 1 content artifacts, 2 contents, 3 scan results"
        );
    }
}
