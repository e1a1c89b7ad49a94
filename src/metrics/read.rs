//! Disk read throughput in MB/s
//! Source: hdparm -Tt /dev/sda (root only)

use crate::utils::{MetricResult, Value};

use super::{parse_field, GatherError, GatherResult, Metric, SharedShell};

const COMMAND: &str = "hdparm -Tt /dev/sda";
const RUNS: usize = 3;

pub const CACHED_READ_RATE: &str = "cached_read_rate";
pub const BUFFERED_READ_RATE: &str = "buffered_read_rate";

pub struct ReadMetric {
    shell: SharedShell,
}

impl ReadMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

impl Metric for ReadMetric {
    fn type_name(&self) -> &'static str {
        "ReadMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[CACHED_READ_RATE, BUFFERED_READ_RATE]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        // hdparm needs raw device access
        if self.shell.effective_uid() != 0 {
            return Ok(MetricResult::new());
        }

        let mut cached = 0.0;
        let mut buffered = 0.0;
        for _ in 0..RUNS {
            let out = self.shell.run(COMMAND)?;
            let (c, b) = parse_hdparm(&out.stdout)?;
            cached += c;
            buffered += b;
        }

        let mut result = MetricResult::new();
        result.insert(CACHED_READ_RATE, Value::Float(cached / RUNS as f64));
        result.insert(BUFFERED_READ_RATE, Value::Float(buffered / RUNS as f64));
        Ok(result)
    }
}

/// ` Timing cached reads:   18192 MB in  2.00 seconds = 9105.79 MB/sec`
fn parse_hdparm(stdout: &str) -> GatherResult<(f64, f64)> {
    let rate_of = |marker: &str| -> GatherResult<f64> {
        let line = stdout
            .lines()
            .find(|l| l.contains(marker))
            .ok_or_else(|| GatherError::Parse(format!("hdparm: no {:?} line", marker)))?;
        let raw = line
            .rsplit('=')
            .next()
            .and_then(|tail| tail.split_whitespace().next())
            .ok_or_else(|| GatherError::Parse(format!("hdparm: {:?}", line)))?;
        parse_field(raw, marker)
    };

    Ok((rate_of("cached reads")?, rate_of("buffered disk reads")?))
}
