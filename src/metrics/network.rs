//! Reachability of well-known hosts
//! Source: ping -c 1 -W 1 <ip>, hostname

use std::time::Duration;

use crate::utils::{MetricResult, OrderedMap, Value};

use super::{shell_quote, GatherResult, Metric, SharedShell};

pub const DEFAULT_IPS: &[&str] = &["8.8.8.8", "8.8.4.4"];
const PING_TIMEOUT: Duration = Duration::from_secs(5);
const HOSTNAME_COMMAND: &str = "hostname";

pub const CONNECTED: &str = "connected";
pub const HOSTNAME_PREFIX: &str = "hostname_prefix";

pub struct NetworkMetric {
    shell: SharedShell,
    ips: Vec<String>,
}

impl NetworkMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self::with_ips(shell, DEFAULT_IPS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_ips(shell: SharedShell, ips: Vec<String>) -> Self {
        Self { shell, ips }
    }

    fn is_connected(&self, ip: &str) -> bool {
        let command = ping_command(ip);
        // any failure at all, including a missing ping, counts as unreachable
        self.shell
            .run_with(&command, PING_TIMEOUT, true)
            .map(|r| r.success())
            .unwrap_or(false)
    }

    fn hostname_prefix(&self) -> Value {
        match self.shell.run(HOSTNAME_COMMAND) {
            Ok(out) => Value::from(prefix_of(out.stdout.trim())),
            Err(e) => {
                tracing::warn!(error = %e, "cannot read hostname");
                Value::Null
            }
        }
    }
}

impl Metric for NetworkMetric {
    fn type_name(&self) -> &'static str {
        "NetworkMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[CONNECTED, HOSTNAME_PREFIX]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let connected: OrderedMap<Value> = self
            .ips
            .iter()
            .map(|ip| (ip.clone(), Value::Bool(self.is_connected(ip))))
            .collect();

        let mut result = MetricResult::new();
        result.insert(CONNECTED, Value::Object(connected));
        result.insert(HOSTNAME_PREFIX, self.hostname_prefix());
        Ok(result)
    }
}

fn ping_command(ip: &str) -> String {
    format!("ping -c 1 -W 1 {}", shell_quote(ip))
}

/// Lab hosts are named `<prefix>-row<N>-host<M>`; keep what precedes the first dash.
fn prefix_of(hostname: &str) -> &str {
    hostname.split('-').next().unwrap_or(hostname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::fake::FakeShell;
    use crate::shell::CommandResult;
    use std::rc::Rc;

    #[test]
    fn ping_exit_status_decides_connectivity() {
        let shell = Rc::new(
            FakeShell::new()
                .with_stdout(&ping_command("8.8.8.8"), "1 packets transmitted, 1 received")
                .with_result(&ping_command("8.8.4.4"), CommandResult::new("", "", 1))
                .with_stdout(HOSTNAME_COMMAND, "chromeos1-row2-host3\n"),
        );
        let r = NetworkMetric::new(shell).gather();

        let connected = match r.get(CONNECTED) {
            Some(Value::Object(m)) => m.clone(),
            other => panic!("unexpected: {:?}", other),
        };
        assert_eq!(connected.get("8.8.8.8"), Some(&Value::Bool(true)));
        assert_eq!(connected.get("8.8.4.4"), Some(&Value::Bool(false)));
        assert_eq!(r.get(HOSTNAME_PREFIX), Some(&Value::from("chromeos1")));
    }

    #[test]
    fn missing_ping_is_disconnected() {
        let shell = Rc::new(FakeShell::new());
        let r = NetworkMetric::with_ips(shell, vec!["10.0.0.1".into()]).gather();
        match r.get(CONNECTED) {
            Some(Value::Object(m)) => assert_eq!(m.get("10.0.0.1"), Some(&Value::Bool(false))),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(r.get(HOSTNAME_PREFIX), Some(&Value::Null));
    }

    #[test]
    fn failed_hostname_gives_null_prefix() {
        let shell = Rc::new(
            FakeShell::new()
                .with_stdout(&ping_command("8.8.8.8"), "")
                .with_result(HOSTNAME_COMMAND, CommandResult::new("", "hostname: error", 1)),
        );
        let r = NetworkMetric::with_ips(shell, vec!["8.8.8.8".into()]).gather();
        assert_eq!(r.get(HOSTNAME_PREFIX), Some(&Value::Null));
    }

    #[test]
    fn configured_ips_are_quoted() {
        let shell = Rc::new(FakeShell::new());
        NetworkMetric::with_ips(shell.clone(), vec!["10.0.0.1; reboot".into()]).gather();
        assert_eq!(shell.calls()[0], "ping -c 1 -W 1 '10.0.0.1; reboot'");
    }

    #[test]
    fn prefix_stops_at_first_dash() {
        assert_eq!(prefix_of("chromeos6-row4-rack9-host1"), "chromeos6");
        assert_eq!(prefix_of("labhost"), "labhost");
    }
}
