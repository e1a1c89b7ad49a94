//! ADB device inventory, grouped by state
//! Source: adb devices

use crate::utils::{MetricResult, Value};

use super::{GatherResult, Metric, SharedShell};

const COMMAND: &str = "adb devices";

pub const UNAUTHORIZED: &str = "unauthorized";
pub const OFFLINE: &str = "offline";
pub const RECOVERY: &str = "recovery";
pub const QUESTION: &str = "question";
pub const DEVICE: &str = "device";
pub const TOTAL_UNHEALTHY: &str = "total_unhealthy";

pub struct VerifyMetric {
    shell: SharedShell,
}

impl VerifyMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

#[derive(Debug, Default, PartialEq)]
struct Inventory {
    unauthorized: Vec<String>,
    offline: Vec<String>,
    recovery: Vec<String>,
    question: Vec<String>,
    device: Vec<String>,
}

impl Inventory {
    fn unhealthy(&self) -> usize {
        self.unauthorized.len() + self.offline.len() + self.recovery.len() + self.question.len()
    }
}

impl Metric for VerifyMetric {
    fn type_name(&self) -> &'static str {
        "VerifyMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[UNAUTHORIZED, OFFLINE, RECOVERY, QUESTION, DEVICE, TOTAL_UNHEALTHY]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let out = self.shell.run(COMMAND)?;
        let inv = parse_devices(&out.stdout);

        let mut result = MetricResult::new();
        result.insert(TOTAL_UNHEALTHY, Value::from(inv.unhealthy()));
        result.insert(UNAUTHORIZED, Value::from(inv.unauthorized));
        result.insert(OFFLINE, Value::from(inv.offline));
        result.insert(RECOVERY, Value::from(inv.recovery));
        result.insert(QUESTION, Value::from(inv.question));
        result.insert(DEVICE, Value::from(inv.device));
        Ok(result)
    }
}

/// Lines after the `List of devices attached` header are `<serial>\t<state>`.
/// States adb does not name explicitly ("no permissions", "?") land in `question`.
fn parse_devices(stdout: &str) -> Inventory {
    let mut inv = Inventory::default();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (serial, state) = match (parts.next(), parts.next()) {
            (Some(serial), Some(state)) => (serial.to_string(), state),
            _ => continue,
        };
        match state {
            "device" => inv.device.push(serial),
            "offline" => inv.offline.push(serial),
            "unauthorized" => inv.unauthorized.push(serial),
            "recovery" => inv.recovery.push(serial),
            _ => inv.question.push(serial),
        }
    }

    inv
}
