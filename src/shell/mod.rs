//! Host command gateway
//! Every metric talks to the OS through `Shell`; nothing else spawns processes.

pub mod local;
pub mod process;

#[cfg(test)]
pub mod fake;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use local::LocalShell;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Exit status `sh` reports when the program is not on PATH.
const EXIT_COMMAND_NOT_FOUND: i32 = 127;

// ── 数据结构 ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl CommandResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_status: i32) -> Self {
        Self { stdout: stdout.into(), stderr: stderr.into(), exit_status }
    }

    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("`{command}` exited with status {}: {}", .result.exit_status, .result.stderr.trim())]
    CommandFailed { command: String, result: CommandResult },

    #[error("tool not found for `{0}`")]
    ToolMissing(String),

    #[error("IO error running command: {0}")]
    Io(#[from] std::io::Error),
}

pub type ShellResult<T> = std::result::Result<T, ShellError>;

// ── Shell ───────────────────────────────────────────────────────────────────

pub trait Shell {
    /// Run `command` through the host shell.
    ///
    /// Fails with `Timeout` once `timeout` elapses (the child is killed and
    /// reaped first), with `ToolMissing` when the program does not exist, and
    /// with `CommandFailed` on a non-zero exit unless `ignore_status` is set.
    fn run_with(&self, command: &str, timeout: Duration, ignore_status: bool) -> ShellResult<CommandResult>;

    /// PIDs of processes whose argv contains `identifier`.
    fn pids_of(&self, identifier: &str) -> Box<dyn Iterator<Item = u32> + '_>;

    fn effective_uid(&self) -> u32 {
        nix::unistd::geteuid().as_raw()
    }

    fn run(&self, command: &str) -> ShellResult<CommandResult> {
        self.run_with(command, DEFAULT_TIMEOUT, false)
    }

    fn run_ignoring_status(&self, command: &str) -> ShellResult<CommandResult> {
        self.run_with(command, DEFAULT_TIMEOUT, true)
    }
}

/// Map a finished command onto the `run_with` contract.
pub(crate) fn check_status(command: &str, result: CommandResult, ignore_status: bool) -> ShellResult<CommandResult> {
    if result.exit_status == EXIT_COMMAND_NOT_FOUND {
        return Err(ShellError::ToolMissing(command.to_string()));
    }
    if !ignore_status && !result.success() {
        return Err(ShellError::CommandFailed { command: command.to_string(), result });
    }
    Ok(result)
}
