//! Fingerprint of the ADB vendor keys directory
//! Source: $ADB_VENDOR_KEYS, find + md5sum

use std::env;

use crate::utils::{MetricResult, Value};

use super::{nth_token, shell_quote, GatherResult, Metric, SharedShell};

pub const KEYS_ENV_VAR: &str = "ADB_VENDOR_KEYS";

pub const KEYS_PATH: &str = "keys_path";
pub const HASH: &str = "hash";

pub struct AdbHashMetric {
    shell: SharedShell,
    keys_path: Option<String>,
}

impl AdbHashMetric {
    pub fn from_env(shell: SharedShell) -> Self {
        Self::from_var(shell, env::var(KEYS_ENV_VAR).ok())
    }

    /// An empty value counts as unset.
    fn from_var(shell: SharedShell, value: Option<String>) -> Self {
        Self::with_keys_path(shell, value.filter(|p| !p.is_empty()))
    }

    pub fn with_keys_path(shell: SharedShell, keys_path: Option<String>) -> Self {
        Self { shell, keys_path }
    }

    /// md5 over the sorted md5s of every non-hidden file below `path`.
    fn hash(&self, path: &str) -> GatherResult<String> {
        let quoted = shell_quote(path);
        self.shell.run(&format!("test -e {}", quoted))?;
        let out = self.shell.run(&format!(
            "find {} -type f -not -name '.*' -exec md5sum {{}} + | awk '{{print $1}}' | sort | md5sum",
            quoted
        ))?;
        Ok(nth_token(&out.stdout, 0, "md5sum")?.to_string())
    }
}

impl Metric for AdbHashMetric {
    fn type_name(&self) -> &'static str {
        "AdbHashMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[KEYS_PATH, HASH]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let mut result = MetricResult::new();
        let path = match &self.keys_path {
            Some(path) => path,
            None => return Ok(result),
        };

        result.insert(KEYS_PATH, Value::from(path.as_str()));
        match self.hash(path) {
            Ok(hash) => {
                result.insert(HASH, Value::Str(hash));
            }
            Err(e) => tracing::warn!(path = %path, error = %e, "cannot hash adb vendor keys"),
        }
        Ok(result)
    }
}
