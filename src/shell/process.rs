use std::fs;
use std::io::ErrorKind;

/// Lazily walk `/proc` and yield every PID whose argv contains `identifier`.
///
/// Processes that exit mid-walk are skipped silently.
pub fn pids_matching(identifier: String) -> impl Iterator<Item = u32> {
    fs::read_dir("/proc")
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()))
        .filter(move |pid| {
            read_cmdline(*pid)
                .map(|argv| argv_matches(&argv, &identifier))
                .unwrap_or(false)
        })
}

/// NUL-separated argv of `pid`, or `None` if the process is gone.
///
/// Kernel threads and zombies have an empty cmdline.
pub fn read_cmdline(pid: u32) -> Option<Vec<String>> {
    let path = format!("/proc/{}/cmdline", pid);
    let raw = match fs::read(&path) {
        Ok(raw) => raw,
        // ENOENT / ESRCH: process exited while we were looking at it
        Err(e) if e.kind() == ErrorKind::NotFound || e.raw_os_error() == Some(3) => return None,
        Err(e) => {
            tracing::debug!(pid, error = %e, "cannot read cmdline");
            return None;
        }
    };
    Some(
        raw.split(|b| *b == 0)
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect(),
    )
}

fn argv_matches(argv: &[String], identifier: &str) -> bool {
    !argv.is_empty() && argv.join(" ").contains(identifier)
}
