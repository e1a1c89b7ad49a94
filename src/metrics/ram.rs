//! Memory usage in MiB
//! Source: free -m

use crate::utils::{MetricResult, Value};

use super::{nth_token, parse_field, GatherError, GatherResult, Metric, SharedShell};

const COMMAND: &str = "free -m";

pub const TOTAL: &str = "total";
pub const USED: &str = "used";
pub const FREE: &str = "free";
pub const BUFFERS: &str = "buffers";
pub const CACHED: &str = "cached";

pub struct RamMetric {
    shell: SharedShell,
}

impl RamMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

impl Metric for RamMetric {
    fn type_name(&self) -> &'static str {
        "RamMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[TOTAL, USED, FREE, BUFFERS, CACHED]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let out = self.shell.run(COMMAND)?;
        parse_free(&out.stdout)
    }
}

/// Second line of `free -m`: `Mem: total used free shared buffers cached`.
fn parse_free(stdout: &str) -> GatherResult<MetricResult> {
    let line = stdout
        .lines()
        .nth(1)
        .ok_or_else(|| GatherError::Parse(format!("free -m: {:?}", stdout)))?;

    let column = |n: usize, key: &str| -> GatherResult<Value> {
        let raw = nth_token(line, n, key)?;
        Ok(Value::Int(parse_field(raw, key)?))
    };

    let mut result = MetricResult::new();
    result.insert(TOTAL, column(1, TOTAL)?);
    result.insert(USED, column(2, USED)?);
    result.insert(FREE, column(3, FREE)?);
    result.insert(BUFFERS, column(5, BUFFERS)?);
    result.insert(CACHED, column(6, CACHED)?);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::fake::FakeShell;
    use std::rc::Rc;

    const FREE_OUTPUT: &str = "              total        used        free      shared  buff/cache   available\n\
Mem: 64350 34633 29717 556 1744 24692\n\
Swap:          2047           0        2047\n";

    #[test]
    fn parses_second_line() {
        let shell = Rc::new(FakeShell::new().with_stdout(COMMAND, FREE_OUTPUT));
        let r = RamMetric::new(shell).gather();
        assert_eq!(r.get(TOTAL), Some(&Value::Int(64350)));
        assert_eq!(r.get(USED), Some(&Value::Int(34633)));
        assert_eq!(r.get(FREE), Some(&Value::Int(29717)));
        assert_eq!(r.get(BUFFERS), Some(&Value::Int(1744)));
        assert_eq!(r.get(CACHED), Some(&Value::Int(24692)));
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn missing_tool_gives_nulls() {
        let shell = Rc::new(FakeShell::new().with_missing(COMMAND));
        let metric = RamMetric::new(shell);
        assert_eq!(metric.name(), "ram");
        let r = metric.gather();
        assert_eq!(r.len(), 5);
        assert!(r.iter().all(|(_, v)| v.is_null()));
    }

    #[test]
    fn truncated_output_gives_nulls() {
        let shell = Rc::new(FakeShell::new().with_stdout(COMMAND, "header only\n"));
        let r = RamMetric::new(shell).gather();
        assert!(r.iter().all(|(_, v)| v.is_null()));
    }
}
