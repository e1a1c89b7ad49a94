//! Host metrics
//! Each metric measures one aspect of the host through a `Shell` and returns a
//! fixed set of fields. Failures never escape `gather()`: unmeasurable fields
//! come back as null.

pub mod adb_hash;
pub mod cpu;
pub mod disk;
pub mod name;
pub mod network;
pub mod process_time;
pub mod ram;
pub mod read;
pub mod system_load;
pub mod uptime;
pub mod usb;
pub mod verify;
pub mod version;
pub mod zombie;

use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::shell::{Shell, ShellError};
use crate::utils::{MetricResult, Value};

pub use adb_hash::AdbHashMetric;
pub use cpu::CpuMetric;
pub use disk::DiskMetric;
pub use name::NameMetric;
pub use network::NetworkMetric;
pub use process_time::ProcessTimeMetric;
pub use ram::RamMetric;
pub use read::ReadMetric;
pub use system_load::SystemLoadMetric;
pub use uptime::UptimeMetric;
pub use usb::UsbMetric;
pub use verify::VerifyMetric;
pub use version::VersionMetric;
pub use zombie::ZombieMetric;

pub type SharedShell = Rc<dyn Shell>;

#[derive(Error, Debug)]
pub enum GatherError {
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error("unexpected output: {0}")]
    Parse(String),
}

pub type GatherResult<T> = std::result::Result<T, GatherError>;

// ── Metric ──────────────────────────────────────────────────────────────────

pub trait Metric {
    /// Declared type name, e.g. `AdbHashMetric`; the result name derives from it.
    fn type_name(&self) -> &'static str;

    /// Every field `gather()` produces, in output order.
    fn keys(&self) -> &'static [&'static str];

    /// Take the measurement. May fail; `gather()` turns failures into nulls.
    fn measure(&self) -> GatherResult<MetricResult>;

    fn name(&self) -> String {
        canonical_name(self.type_name())
    }

    fn gather(&self) -> MetricResult {
        let measured = self.measure();
        if let Err(ref e) = measured {
            warn!(metric = %self.name(), error = %e, "measurement failed, reporting nulls");
        }
        with_fixed_keys(self.keys(), measured.unwrap_or_default())
    }
}

/// Project `result` onto `keys`; absent fields become null, extras are dropped.
pub fn with_fixed_keys(keys: &[&str], result: MetricResult) -> MetricResult {
    keys.iter()
        .map(|k| (*k, result.get(k).cloned().unwrap_or(Value::Null)))
        .collect()
}

/// `CPUMetric` → `cpu`, `AdbHashMetric` → `adb_hash`.
pub fn canonical_name(type_name: &str) -> String {
    let chars: Vec<char> = type_name.chars().collect();
    let mut snake = String::with_capacity(type_name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            // "aB" starts a word, and so does "ABc" at the B (acronym end)
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                snake.push('_');
            }
        }
        snake.extend(c.to_lowercase());
    }

    match snake.strip_suffix("_metric") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => snake,
    }
}

// ── 解析工具 ────────────────────────────────────────────────────────────────

pub(crate) fn parse_field<T: FromStr>(raw: &str, what: &str) -> GatherResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| GatherError::Parse(format!("{}: {:?}", what, raw)))
}

/// Single-quote `s` for `sh -c`.
pub(crate) fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// The `n`th whitespace-separated token of `line`.
pub(crate) fn nth_token<'a>(line: &'a str, n: usize, what: &str) -> GatherResult<&'a str> {
    line.split_whitespace()
        .nth(n)
        .ok_or_else(|| GatherError::Parse(format!("{}: missing column {} in {:?}", what, n, line)))
}
