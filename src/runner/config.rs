//! Run configuration: JSON config file merged with CLI flags

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::metrics::network::DEFAULT_IPS;
use crate::metrics::usb::DEFAULT_WINDOW;
use crate::reporters::json::DEFAULT_OUTPUT;
use crate::utils::{LabHealthError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    Logger,
    Json,
}

/// `"network": true` or `"network": ["8.8.8.8", ...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkOption {
    Enabled(bool),
    Hosts(Vec<String>),
}

/// Every recognised option. `None` means "not given here".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    pub reporter: Option<Vec<ReporterKind>>,
    pub output: Option<PathBuf>,
    pub health_config: Option<PathBuf>,
    pub usb_io: Option<bool>,
    pub usb_window: Option<u64>,
    pub disk: Option<bool>,
    pub ram: Option<bool>,
    pub network: Option<NetworkOption>,
    pub verify_devices: Option<bool>,
    pub zombie: Option<bool>,
    pub process_time: Option<bool>,
    pub cpu: Option<bool>,
    pub disk_usage: Option<bool>,
    pub uptime: Option<bool>,
    pub system_load: Option<bool>,
    pub name: Option<bool>,
    pub version: Option<bool>,
}

impl Options {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| LabHealthError::Config(format!("cannot read config {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| LabHealthError::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Fields set in `over` win.
    pub fn merge(self, over: Options) -> Options {
        Options {
            reporter: over.reporter.or(self.reporter),
            output: over.output.or(self.output),
            health_config: over.health_config.or(self.health_config),
            usb_io: over.usb_io.or(self.usb_io),
            usb_window: over.usb_window.or(self.usb_window),
            disk: over.disk.or(self.disk),
            ram: over.ram.or(self.ram),
            network: over.network.or(self.network),
            verify_devices: over.verify_devices.or(self.verify_devices),
            zombie: over.zombie.or(self.zombie),
            process_time: over.process_time.or(self.process_time),
            cpu: over.cpu.or(self.cpu),
            disk_usage: over.disk_usage.or(self.disk_usage),
            uptime: over.uptime.or(self.uptime),
            system_load: over.system_load.or(self.system_load),
            name: over.name.or(self.name),
            version: over.version.or(self.version),
        }
    }

    // ── resolved values ─────────────────────────────────────────────────────

    pub fn reporters(&self) -> Vec<ReporterKind> {
        self.reporter.clone().unwrap_or_else(|| vec![ReporterKind::Logger])
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn usb_window(&self) -> Duration {
        self.usb_window.map(Duration::from_secs).unwrap_or(DEFAULT_WINDOW)
    }

    /// IPs to ping, or `None` when the network metric is off.
    pub fn network_ips(&self) -> Option<Vec<String>> {
        let defaults = || DEFAULT_IPS.iter().map(|s| s.to_string()).collect();
        match &self.network {
            None | Some(NetworkOption::Enabled(false)) => None,
            Some(NetworkOption::Enabled(true)) => Some(defaults()),
            Some(NetworkOption::Hosts(ips)) if ips.is_empty() => Some(defaults()),
            Some(NetworkOption::Hosts(ips)) => Some(ips.clone()),
        }
    }
}

pub(crate) fn enabled(flag: Option<bool>) -> bool {
    flag.unwrap_or(false)
}
