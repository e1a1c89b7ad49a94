//! `Shell` backed by `sh -c` on the local host

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io::{ErrorKind, Read};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{check_status, process, CommandResult, Shell, ShellError, ShellResult};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Default, Clone)]
pub struct LocalShell;

impl LocalShell {
    pub fn new() -> Self {
        Self
    }
}

impl Shell for LocalShell {
    fn run_with(&self, command: &str, timeout: Duration, ignore_status: bool) -> ShellResult<CommandResult> {
        debug!(command, timeout_secs = timeout.as_secs(), "running");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // own process group so a timeout takes grandchildren down too
            .process_group(0)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ShellError::ToolMissing(command.to_string()),
                _ => ShellError::Io(e),
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_deadline(&mut child, timeout);

        // child is dead or reaped past this point, so both pipes hit EOF
        let stdout = join(stdout);
        let stderr = join(stderr);

        let status = match status? {
            Some(status) => status,
            None => {
                return Err(ShellError::Timeout {
                    command: command.to_string(),
                    seconds: timeout.as_secs(),
                })
            }
        };

        let result = CommandResult::new(stdout, stderr, exit_code(status));
        check_status(command, result, ignore_status)
    }

    fn pids_of(&self, identifier: &str) -> Box<dyn Iterator<Item = u32> + '_> {
        Box::new(process::pids_matching(identifier.to_string()))
    }
}

// ── 子进程管理 ──────────────────────────────────────────────────────────────

/// `Ok(None)` means the deadline passed; the process group has been killed
/// and the child reaped.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            kill_group(child);
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill_group(child: &mut Child) {
    let pgid = Pid::from_raw(child.id() as i32);
    if let Err(e) = killpg(pgid, Signal::SIGKILL) {
        debug!(pid = child.id(), error = %e, "killpg failed, killing child only");
        let _ = child.kill();
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn exit_code(status: ExitStatus) -> i32 {
    // killed by signal: follow the shell convention of 128 + signo
    status.code().or_else(|| status.signal().map(|s| 128 + s)).unwrap_or(-1)
}
