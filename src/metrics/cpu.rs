//! CPU utilisation across all cores
//! Source: /proc/stat sampled twice, nproc

use crate::utils::{MetricResult, Value};

use super::{parse_field, GatherError, GatherResult, Metric, SharedShell};

const SAMPLE_COMMAND: &str = "head -n1 /proc/stat; sleep 1; head -n1 /proc/stat";
const NPROC_COMMAND: &str = "nproc";

pub const CPU_PERCENT: &str = "cpu_percent";
pub const NUM_CPUS: &str = "num_cpus";

pub struct CpuMetric {
    shell: SharedShell,
}

impl CpuMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

impl Metric for CpuMetric {
    fn type_name(&self) -> &'static str {
        "CPUMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[CPU_PERCENT, NUM_CPUS]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let mut result = MetricResult::new();

        let samples = self.shell.run(SAMPLE_COMMAND)?;
        result.insert(CPU_PERCENT, Value::Float(busy_percent(&samples.stdout)?));

        let cpus = self
            .shell
            .run(NPROC_COMMAND)
            .map_err(GatherError::from)
            .and_then(|out| parse_field::<i64>(&out.stdout, NPROC_COMMAND));
        match cpus {
            Ok(n) => {
                result.insert(NUM_CPUS, Value::Int(n));
            }
            Err(e) => tracing::warn!(error = %e, "cannot count cpus"),
        }
        Ok(result)
    }
}

/// (busy, total) jiffies from a `cpu  user nice system idle iowait ...` line.
fn jiffies(line: &str) -> GatherResult<(u64, u64)> {
    let values = line
        .split_whitespace()
        .skip(1)
        .map(|v| parse_field::<u64>(v, "/proc/stat"))
        .collect::<GatherResult<Vec<u64>>>()?;
    if values.len() < 4 {
        return Err(GatherError::Parse(format!("/proc/stat: {:?}", line)));
    }
    let total: u64 = values.iter().sum();
    // idle + iowait
    let idle = values[3] + values.get(4).copied().unwrap_or(0);
    Ok((total - idle, total))
}

fn busy_percent(stdout: &str) -> GatherResult<f64> {
    let lines: Vec<&str> = stdout.lines().filter(|l| l.starts_with("cpu ")).collect();
    if lines.len() != 2 {
        return Err(GatherError::Parse(format!("expected two cpu samples, got {}", lines.len())));
    }
    let (busy0, total0) = jiffies(lines[0])?;
    let (busy1, total1) = jiffies(lines[1])?;
    let total = total1.saturating_sub(total0);
    if total == 0 {
        return Ok(0.0);
    }
    Ok(busy1.saturating_sub(busy0) as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::fake::FakeShell;
    use std::rc::Rc;

    #[test]
    fn percent_from_two_samples() {
        let stat = "cpu  100 0 100 800 0 0 0 0 0 0\ncpu  150 0 150 900 0 0 0 0 0 0\n";
        let shell = Rc::new(FakeShell::new().with_stdout(SAMPLE_COMMAND, stat).with_stdout(NPROC_COMMAND, "8\n"));
        let metric = CpuMetric::new(shell);
        assert_eq!(metric.name(), "cpu");
        let r = metric.gather();
        assert_eq!(r.get(CPU_PERCENT), Some(&Value::Float(50.0)));
        assert_eq!(r.get(NUM_CPUS), Some(&Value::Int(8)));
    }

    #[test]
    fn missing_nproc_keeps_percent() {
        let stat = "cpu  0 0 0 10\ncpu  0 0 0 20\n";
        let shell = Rc::new(FakeShell::new().with_stdout(SAMPLE_COMMAND, stat));
        let r = CpuMetric::new(shell).gather();
        assert_eq!(r.get(CPU_PERCENT), Some(&Value::Float(0.0)));
        assert_eq!(r.get(NUM_CPUS), Some(&Value::Null));
    }

    #[test]
    fn garbled_nproc_keeps_percent() {
        let stat = "cpu  0 0 0 10\ncpu  0 0 0 20\n";
        let shell = Rc::new(FakeShell::new().with_stdout(SAMPLE_COMMAND, stat).with_stdout(NPROC_COMMAND, "lots\n"));
        let r = CpuMetric::new(shell).gather();
        assert_eq!(r.get(CPU_PERCENT), Some(&Value::Float(0.0)));
        assert_eq!(r.get(NUM_CPUS), Some(&Value::Null));
    }
}
