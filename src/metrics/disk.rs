//! Root filesystem usage
//! Source: df -k /

use crate::utils::{MetricResult, Value};

use super::{nth_token, parse_field, GatherError, GatherResult, Metric, SharedShell};

const COMMAND: &str = "df -k /";

pub const TOTAL: &str = "total";
pub const USED: &str = "used";
pub const AVAIL: &str = "avail";
pub const PERCENT_USED: &str = "percent_used";

pub struct DiskMetric {
    shell: SharedShell,
}

impl DiskMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

impl Metric for DiskMetric {
    fn type_name(&self) -> &'static str {
        "DiskMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[TOTAL, USED, AVAIL, PERCENT_USED]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let out = self.shell.run(COMMAND)?;
        // Filesystem 1K-blocks Used Available Use% Mounted on
        let line = out
            .stdout
            .lines()
            .nth(1)
            .ok_or_else(|| GatherError::Parse(format!("df: {:?}", out.stdout)))?;

        let int = |n: usize, key: &str| -> GatherResult<Value> {
            let raw = nth_token(line, n, key)?.trim_end_matches('%');
            Ok(Value::Int(parse_field(raw, key)?))
        };

        let mut result = MetricResult::new();
        result.insert(TOTAL, int(1, TOTAL)?);
        result.insert(USED, int(2, USED)?);
        result.insert(AVAIL, int(3, AVAIL)?);
        result.insert(PERCENT_USED, int(4, PERCENT_USED)?);
        Ok(result)
    }
}
