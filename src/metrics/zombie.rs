//! Defunct processes, with adb/fastboot zombies mapped to their device serial
//! Source: ps -eo pid,stat,comm,args

use crate::utils::{MetricResult, Value};

use super::{GatherResult, Metric, SharedShell};

const COMMAND: &str = "ps -eo pid,stat,comm,args";

pub const ADB_ZOMBIES: &str = "adb_zombies";
pub const FASTBOOT_ZOMBIES: &str = "fastboot_zombies";
pub const OTHER_ZOMBIES: &str = "other_zombies";
pub const NUM_ADB_ZOMBIES: &str = "num_adb_zombies";
pub const NUM_FASTBOOT_ZOMBIES: &str = "num_fastboot_zombies";
pub const NUM_OTHER_ZOMBIES: &str = "num_other_zombies";

pub struct ZombieMetric {
    shell: SharedShell,
}

impl ZombieMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self { shell }
    }
}

#[derive(Debug, PartialEq)]
struct PsLine<'a> {
    pid: &'a str,
    stat: &'a str,
    comm: &'a str,
    args: Vec<&'a str>,
}

#[derive(Debug, Default)]
struct Zombies {
    adb: Vec<Option<String>>,
    fastboot: Vec<Option<String>>,
    other: Vec<String>,
}

impl Metric for ZombieMetric {
    fn type_name(&self) -> &'static str {
        "ZombieMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[
            ADB_ZOMBIES,
            FASTBOOT_ZOMBIES,
            OTHER_ZOMBIES,
            NUM_ADB_ZOMBIES,
            NUM_FASTBOOT_ZOMBIES,
            NUM_OTHER_ZOMBIES,
        ]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let out = self.shell.run(COMMAND)?;
        let z = find_zombies(&out.stdout);

        let mut result = MetricResult::new();
        result.insert(NUM_ADB_ZOMBIES, Value::from(z.adb.len()));
        result.insert(NUM_FASTBOOT_ZOMBIES, Value::from(z.fastboot.len()));
        result.insert(NUM_OTHER_ZOMBIES, Value::from(z.other.len()));
        result.insert(ADB_ZOMBIES, Value::from(z.adb));
        result.insert(FASTBOOT_ZOMBIES, Value::from(z.fastboot));
        result.insert(OTHER_ZOMBIES, Value::from(z.other));
        Ok(result)
    }
}

fn parse_ps_line(line: &str) -> Option<PsLine<'_>> {
    let mut tokens = line.split_whitespace();
    let pid = tokens.next()?;
    if pid.parse::<u32>().is_err() {
        return None; // header
    }
    Some(PsLine {
        pid,
        stat: tokens.next()?,
        comm: tokens.next()?,
        args: tokens.collect(),
    })
}

/// Value following `-s` in argv, if any.
fn serial_of(args: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| *a == "-s")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.to_string())
}

fn find_zombies(stdout: &str) -> Zombies {
    let mut z = Zombies::default();

    for ps in stdout.lines().filter_map(parse_ps_line) {
        if !ps.stat.starts_with('Z') {
            continue;
        }
        match ps.comm {
            "adb" => z.adb.push(serial_of(&ps.args)),
            "fastboot" => z.fastboot.push(serial_of(&ps.args)),
            _ => z.other.push(ps.pid.to_string()),
        }
    }

    z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::fake::FakeShell;
    use std::rc::Rc;

    const PS: &str = "    PID STAT COMMAND         COMMAND\n\
      1 Ss   systemd         /sbin/init\n\
    200 Z    adb             adb -s HT1 shell\n\
    201 Z    adb             [adb] <defunct>\n\
    300 Zs   fastboot        fastboot -s FB9 reboot\n\
    400 Z+   python3         [python3] <defunct>\n\
    500 S    adb             adb -s HT2 logcat\n";

    #[test]
    fn groups_zombies_by_tool() {
        let shell = Rc::new(FakeShell::new().with_stdout(COMMAND, PS));
        let r = ZombieMetric::new(shell).gather();
        assert_eq!(
            r.get(ADB_ZOMBIES),
            Some(&Value::List(vec![Value::from("HT1"), Value::Null]))
        );
        assert_eq!(r.get(FASTBOOT_ZOMBIES), Some(&Value::from(vec!["FB9"])));
        assert_eq!(r.get(OTHER_ZOMBIES), Some(&Value::from(vec!["400"])));
        assert_eq!(r.get(NUM_ADB_ZOMBIES), Some(&Value::Int(2)));
        assert_eq!(r.get(NUM_FASTBOOT_ZOMBIES), Some(&Value::Int(1)));
        assert_eq!(r.get(NUM_OTHER_ZOMBIES), Some(&Value::Int(1)));
        assert_eq!(r.keys().next(), Some(ADB_ZOMBIES));
    }

    #[test]
    fn header_is_skipped() {
        assert!(parse_ps_line("  PID STAT COMMAND COMMAND").is_none());
        assert_eq!(serial_of(&["adb", "-s"]), None);
    }
}
