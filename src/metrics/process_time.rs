//! Long-running adb / fastboot processes
//! Source: /proc argv walk, ps -o etimes=

use crate::utils::{MetricResult, OrderedMap, Value};

use super::{parse_field, GatherResult, Metric, SharedShell};

pub const ADB_PROCESSES: &str = "adb_processes";
pub const FASTBOOT_PROCESSES: &str = "fastboot_processes";
pub const NUM_ADB_PROCESSES: &str = "num_adb_processes";
pub const NUM_FASTBOOT_PROCESSES: &str = "num_fastboot_processes";

pub struct ProcessTimeMetric {
    shell: SharedShell,
}

impl ProcessTimeMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }

    /// `{pid, elapsed_seconds}` for every live process matching `identifier`.
    /// Processes that exit before `ps` looks at them are dropped.
    fn processes(&self, identifier: &str) -> Vec<Value> {
        let pids: Vec<u32> = self.shell.pids_of(identifier).collect();
        pids.into_iter()
            .filter_map(|pid| {
                let out = self.shell.run(&format!("ps -o etimes= -p {}", pid)).ok()?;
                let elapsed: i64 = parse_field(&out.stdout, "etimes").ok()?;
                let mut obj = OrderedMap::new();
                obj.insert("pid", Value::Int(pid as i64));
                obj.insert("elapsed_seconds", Value::Int(elapsed));
                Some(Value::Object(obj))
            })
            .collect()
    }
}

impl Metric for ProcessTimeMetric {
    fn type_name(&self) -> &'static str {
        "ProcessTimeMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[ADB_PROCESSES, FASTBOOT_PROCESSES, NUM_ADB_PROCESSES, NUM_FASTBOOT_PROCESSES]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let adb = self.processes("adb");
        let fastboot = self.processes("fastboot");

        let mut result = MetricResult::new();
        result.insert(NUM_ADB_PROCESSES, Value::from(adb.len()));
        result.insert(NUM_FASTBOOT_PROCESSES, Value::from(fastboot.len()));
        result.insert(ADB_PROCESSES, Value::List(adb));
        result.insert(FASTBOOT_PROCESSES, Value::List(fastboot));
        Ok(result)
    }
}
