//! Load averages
//! Source: /proc/loadavg

use crate::utils::{MetricResult, Value};

use super::{nth_token, parse_field, GatherResult, Metric, SharedShell};

const COMMAND: &str = "cat /proc/loadavg";

pub const LOAD_AVG_1_MIN: &str = "load_avg_1_min";
pub const LOAD_AVG_5_MIN: &str = "load_avg_5_min";
pub const LOAD_AVG_15_MIN: &str = "load_avg_15_min";

pub struct SystemLoadMetric {
    shell: SharedShell,
}

impl SystemLoadMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

impl Metric for SystemLoadMetric {
    fn type_name(&self) -> &'static str {
        "SystemLoadMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[LOAD_AVG_1_MIN, LOAD_AVG_5_MIN, LOAD_AVG_15_MIN]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let out = self.shell.run(COMMAND)?;
        let mut result = MetricResult::new();
        for (n, key) in self.keys().iter().enumerate() {
            let v: f64 = parse_field(nth_token(&out.stdout, n, key)?, key)?;
            result.insert(*key, Value::Float(v));
        }
        Ok(result)
    }
}
