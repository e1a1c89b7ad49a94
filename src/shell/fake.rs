//! Scripted `Shell` for unit tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use super::{check_status, CommandResult, Shell, ShellError, ShellResult};

enum Scripted {
    Output(CommandResult),
    Timeout,
    Missing,
}

/// Answers commands from a script; unscripted commands look like a missing tool.
pub struct FakeShell {
    script: HashMap<String, Scripted>,
    pids: Vec<(u32, String)>,
    euid: u32,
    calls: RefCell<Vec<String>>,
}

impl Default for FakeShell {
    fn default() -> Self {
        Self {
            script: HashMap::new(),
            pids: Vec::new(),
            euid: 0,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdout(self, command: &str, stdout: &str) -> Self {
        self.with_result(command, CommandResult::new(stdout, "", 0))
    }

    pub fn with_result(mut self, command: &str, result: CommandResult) -> Self {
        self.script.insert(command.to_string(), Scripted::Output(result));
        self
    }

    pub fn with_timeout(mut self, command: &str) -> Self {
        self.script.insert(command.to_string(), Scripted::Timeout);
        self
    }

    pub fn with_missing(mut self, command: &str) -> Self {
        self.script.insert(command.to_string(), Scripted::Missing);
        self
    }

    pub fn with_process(mut self, pid: u32, argv: &str) -> Self {
        self.pids.push((pid, argv.to_string()));
        self
    }

    pub fn with_euid(mut self, euid: u32) -> Self {
        self.euid = euid;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Shell for FakeShell {
    fn run_with(&self, command: &str, timeout: Duration, ignore_status: bool) -> ShellResult<CommandResult> {
        self.calls.borrow_mut().push(command.to_string());
        match self.script.get(command) {
            Some(Scripted::Output(result)) => check_status(command, result.clone(), ignore_status),
            Some(Scripted::Timeout) => Err(ShellError::Timeout {
                command: command.to_string(),
                seconds: timeout.as_secs(),
            }),
            Some(Scripted::Missing) | None => Err(ShellError::ToolMissing(command.to_string())),
        }
    }

    fn pids_of(&self, identifier: &str) -> Box<dyn Iterator<Item = u32> + '_> {
        let identifier = identifier.to_string();
        Box::new(
            self.pids
                .iter()
                .filter(move |(_, argv)| argv.contains(&identifier))
                .map(|(pid, _)| *pid),
        )
    }

    fn effective_uid(&self) -> u32 {
        self.euid
    }
}
