//! Seconds since boot
//! Source: /proc/uptime

use crate::utils::{MetricResult, Value};

use super::{nth_token, parse_field, GatherResult, Metric, SharedShell};

const COMMAND: &str = "cat /proc/uptime";

pub const TIME_SECONDS: &str = "time_seconds";

pub struct UptimeMetric {
    shell: SharedShell,
}

impl UptimeMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

impl Metric for UptimeMetric {
    fn type_name(&self) -> &'static str {
        "UptimeMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[TIME_SECONDS]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let out = self.shell.run(COMMAND)?;
        let seconds: f64 = parse_field(nth_token(&out.stdout, 0, COMMAND)?, TIME_SECONDS)?;

        let mut result = MetricResult::new();
        result.insert(TIME_SECONDS, Value::Float(seconds));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::fake::FakeShell;
    use std::rc::Rc;

    #[test]
    fn first_field_is_uptime() {
        let shell = Rc::new(FakeShell::new().with_stdout(COMMAND, "350735.47 234388.90\n"));
        let r = UptimeMetric::new(shell).gather();
        assert_eq!(r.get(TIME_SECONDS), Some(&Value::Float(350735.47)));
    }
}
