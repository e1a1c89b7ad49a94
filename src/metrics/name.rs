//! Host name
//! Source: hostname

use crate::utils::{MetricResult, Value};

use super::{GatherResult, Metric, SharedShell};

const COMMAND: &str = "hostname";

pub const NAME: &str = "name";

pub struct NameMetric {
    shell: SharedShell,
}

impl NameMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

impl Metric for NameMetric {
    fn type_name(&self) -> &'static str {
        "NameMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[NAME]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let out = self.shell.run(COMMAND)?;
        let mut result = MetricResult::new();
        result.insert(NAME, Value::Str(out.stdout.trim().to_string()));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::fake::FakeShell;
    use std::rc::Rc;

    #[test]
    fn trims_hostname() {
        let shell = Rc::new(FakeShell::new().with_stdout(COMMAND, "lab-rack3-07\n"));
        let r = NameMetric::new(shell).gather();
        assert_eq!(r.get(NAME), Some(&Value::from("lab-rack3-07")));
    }
}
