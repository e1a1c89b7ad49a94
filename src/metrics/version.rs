//! Versions of the kernel and the Android platform tools
//! Source: uname -r, adb version, fastboot --version

use crate::utils::{MetricResult, Value};

use super::{GatherResult, Metric, SharedShell};

pub const KERNEL_RELEASE: &str = "kernel_release";
pub const ADB_VERSION: &str = "adb_version";
pub const FASTBOOT_VERSION: &str = "fastboot_version";

const PROBES: &[(&str, &str)] = &[
    (KERNEL_RELEASE, "uname -r"),
    (ADB_VERSION, "adb version"),
    (FASTBOOT_VERSION, "fastboot --version"),
];

pub struct VersionMetric {
    shell: SharedShell,
}

impl VersionMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

impl Metric for VersionMetric {
    fn type_name(&self) -> &'static str {
        "VersionMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[KERNEL_RELEASE, ADB_VERSION, FASTBOOT_VERSION]
    }

    /// Tools are probed independently; one missing tool only nulls its own field.
    fn measure(&self) -> GatherResult<MetricResult> {
        let mut result = MetricResult::new();
        for (key, command) in PROBES {
            match self.shell.run(command) {
                Ok(out) => {
                    result.insert(*key, Value::from(version_line(&out.stdout)));
                }
                Err(e) => tracing::warn!(command, error = %e, "version probe failed"),
            }
        }
        Ok(result)
    }
}

/// Last whitespace token of the first line: `Android Debug Bridge version 1.0.41` → `1.0.41`.
fn version_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().last())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::fake::FakeShell;
    use std::rc::Rc;

    #[test]
    fn probes_each_tool() {
        let shell = Rc::new(
            FakeShell::new()
                .with_stdout("uname -r", "6.1.0-13-amd64\n")
                .with_stdout("adb version", "Android Debug Bridge version 1.0.41\nVersion 34.0.4\n"),
        );
        let r = VersionMetric::new(shell).gather();
        assert_eq!(r.get(KERNEL_RELEASE), Some(&Value::from("6.1.0-13-amd64")));
        assert_eq!(r.get(ADB_VERSION), Some(&Value::from("1.0.41")));
        assert_eq!(r.get(FASTBOOT_VERSION), Some(&Value::Null));
    }
}
