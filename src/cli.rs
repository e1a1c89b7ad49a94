use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::runner::config::{NetworkOption, Options, ReporterKind};

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "lab-health")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIME"), ")"))]
#[command(about = "Collect lab host health metrics and report them", long_about = None)]
pub struct Cli {
    /// JSON config file; flags given on the command line override it
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Reporters to attach (default: logger)
    #[arg(long, value_enum, value_delimiter = ',', num_args = 1..)]
    pub reporter: Vec<ReporterKind>,

    /// JSON report path (default: output.json)
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// JSON health policy replacing the built-in one
    #[arg(long, value_name = "PATH")]
    pub health_config: Option<PathBuf>,

    /// USB throughput per device (root only)
    #[arg(long)]
    pub usb_io: bool,

    /// USB sampling window in seconds
    #[arg(long, value_name = "SECS")]
    pub usb_window: Option<u64>,

    /// Disk read speed via hdparm (root only)
    #[arg(long)]
    pub disk: bool,

    /// Memory usage
    #[arg(long)]
    pub ram: bool,

    /// Ping the given IPs, or the defaults when none are given
    #[arg(long, value_name = "IP", num_args = 0..)]
    pub network: Option<Vec<String>>,

    /// ADB device states and vendor-key fingerprint
    #[arg(long)]
    pub verify_devices: bool,

    /// Zombie processes
    #[arg(long)]
    pub zombie: bool,

    /// Age of running adb / fastboot processes
    #[arg(long)]
    pub process_time: bool,

    /// CPU utilisation
    #[arg(long)]
    pub cpu: bool,

    /// Root filesystem usage
    #[arg(long)]
    pub disk_usage: bool,

    /// Time since boot
    #[arg(long)]
    pub uptime: bool,

    /// Load averages
    #[arg(long)]
    pub system_load: bool,

    /// Host name
    #[arg(long)]
    pub name: bool,

    /// Kernel, adb and fastboot versions
    #[arg(long)]
    pub tool_versions: bool,
}

fn flag(on: bool) -> Option<bool> {
    on.then_some(true)
}

impl Cli {
    /// Options given on the command line; unset flags stay `None` so the
    /// config file can supply them.
    pub fn options(&self) -> Options {
        Options {
            reporter: (!self.reporter.is_empty()).then(|| self.reporter.clone()),
            output: self.output.clone(),
            health_config: self.health_config.clone(),
            usb_io: flag(self.usb_io),
            usb_window: self.usb_window,
            disk: flag(self.disk),
            ram: flag(self.ram),
            network: self.network.clone().map(NetworkOption::Hosts),
            verify_devices: flag(self.verify_devices),
            zombie: flag(self.zombie),
            process_time: flag(self.process_time),
            cpu: flag(self.cpu),
            disk_usage: flag(self.disk_usage),
            uptime: flag(self.uptime),
            system_load: flag(self.system_load),
            name: flag(self.name),
            version: flag(self.tool_versions),
        }
    }

    /// Render back to an argv that parses to the same `Cli`.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = vec!["lab-health".to_string()];
        let push_path = |argv: &mut Vec<String>, name: &str, p: &Option<PathBuf>| {
            if let Some(p) = p {
                argv.push(format!("--{}", name));
                argv.push(p.to_string_lossy().into_owned());
            }
        };
        push_path(&mut argv, "config", &self.config);
        push_path(&mut argv, "output", &self.output);
        push_path(&mut argv, "health-config", &self.health_config);

        if !self.reporter.is_empty() {
            let kinds: Vec<String> = self
                .reporter
                .iter()
                .filter_map(|k| k.to_possible_value().map(|v| v.get_name().to_string()))
                .collect();
            argv.push("--reporter".into());
            argv.push(kinds.join(","));
        }
        if let Some(secs) = self.usb_window {
            argv.push("--usb-window".into());
            argv.push(secs.to_string());
        }

        let switches = [
            ("usb-io", self.usb_io),
            ("disk", self.disk),
            ("ram", self.ram),
            ("verify-devices", self.verify_devices),
            ("zombie", self.zombie),
            ("process-time", self.process_time),
            ("cpu", self.cpu),
            ("disk-usage", self.disk_usage),
            ("uptime", self.uptime),
            ("system-load", self.system_load),
            ("name", self.name),
            ("tool-versions", self.tool_versions),
        ];
        argv.extend(switches.iter().filter(|(_, on)| *on).map(|(n, _)| format!("--{}", n)));

        // last, since it swallows the values that follow it
        if let Some(ips) = &self.network {
            argv.push("--network".into());
            argv.extend(ips.iter().cloned());
        }
        argv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn parse_is_idempotent() {
        let cli = parse(&[
            "lab-health", "--network", "10.0.0.1", "10.0.0.2", "--reporter", "json,logger", "--ram",
            "--output", "out.json", "--usb-window", "3", "--verify-devices",
        ]);
        let again = Cli::try_parse_from(cli.to_argv()).unwrap();
        assert_eq!(again, cli);
        assert_eq!(again.options(), cli.options());
    }

    #[test]
    fn bare_network_uses_defaults() {
        let cli = parse(&["lab-health", "--network", "--zombie"]);
        assert_eq!(cli.network, Some(vec![]));
        assert!(cli.zombie);
        assert_eq!(cli.options().network_ips(), Some(vec!["8.8.8.8".to_string(), "8.8.4.4".to_string()]));
    }

    #[test]
    fn unset_flags_do_not_override() {
        let opts = parse(&["lab-health"]).options();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["lab-health", "--bogus"]).is_err());
        assert!(Cli::try_parse_from(["lab-health", "--reporter", "pigeon"]).is_err());
    }
}
