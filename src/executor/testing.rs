//! Scripted runner for unit tests

use super::traits::{CommandOutput, CommandRunner};
use crate::pipeline::PipelineError;
use parking_lot::Mutex;

enum Reply {
    Stdout(String),
    Fail(i32, String),
}

/// Records every command line and answers from a list of rules
///
/// The first rule whose pattern is a substring of the command line wins.
/// Unmatched commands succeed with empty output.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    rules: Vec<(String, Reply)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, pattern: &str, stdout: &str) -> Self {
        self.rules
            .push((pattern.to_string(), Reply::Stdout(stdout.to_string())));
        self
    }

    pub(crate) fn fail(mut self, pattern: &str, code: i32, stderr: &str) -> Self {
        self.rules
            .push((pattern.to_string(), Reply::Fail(code, stderr.to_string())));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub(crate) fn calls_containing(&self, pattern: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.contains(pattern))
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command_line: &str) -> Result<CommandOutput, PipelineError> {
        self.calls.lock().push(command_line.to_string());

        let reply = self
            .rules
            .iter()
            .find(|(pattern, _)| command_line.contains(pattern.as_str()))
            .map(|(_, reply)| reply);

        match reply {
            Some(Reply::Fail(code, stderr)) => Err(PipelineError::CommandFailed {
                command: command_line.to_string(),
                code: *code,
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            Some(Reply::Stdout(stdout)) => Ok(CommandOutput::from_stdout(stdout.clone())),
            None => Ok(CommandOutput::default()),
        }
    }
}
