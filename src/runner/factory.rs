//! Options → Runner wiring

use std::rc::Rc;

use crate::health::HealthChecker;
use crate::metrics::*;
use crate::reporters::{JsonReporter, LoggerReporter, Reporter};
use crate::utils::Result;

use super::config::{enabled, Options, ReporterKind};
use super::Runner;

type BuildFn = fn(&Options, &SharedShell) -> Vec<Box<dyn Metric>>;

/// One selectable option and the metrics it switches on.
struct MetricSelector {
    option: &'static str,
    selected: fn(&Options) -> bool,
    build: BuildFn,
}

// ── 选择表 ──────────────────────────────────────────────────────────────────

static METRIC_TABLE: &[MetricSelector] = &[
    MetricSelector { option: "usb_io", selected: |o| enabled(o.usb_io), build: build_usb },
    MetricSelector { option: "disk", selected: |o| enabled(o.disk), build: build_read },
    MetricSelector { option: "ram", selected: |o| enabled(o.ram), build: build_ram },
    MetricSelector { option: "network", selected: |o| o.network_ips().is_some(), build: build_network },
    MetricSelector { option: "verify_devices", selected: |o| enabled(o.verify_devices), build: build_verify_devices },
    MetricSelector { option: "zombie", selected: |o| enabled(o.zombie), build: build_zombie },
    MetricSelector { option: "process_time", selected: |o| enabled(o.process_time), build: build_process_time },
    MetricSelector { option: "cpu", selected: |o| enabled(o.cpu), build: build_cpu },
    MetricSelector { option: "disk_usage", selected: |o| enabled(o.disk_usage), build: build_disk_usage },
    MetricSelector { option: "uptime", selected: |o| enabled(o.uptime), build: build_uptime },
    MetricSelector { option: "system_load", selected: |o| enabled(o.system_load), build: build_system_load },
    MetricSelector { option: "name", selected: |o| enabled(o.name), build: build_name },
    MetricSelector { option: "version", selected: |o| enabled(o.version), build: build_version },
];

fn build_usb(o: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(UsbMetric::with_window(sh.clone(), o.usb_window()))]
}

fn build_read(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(ReadMetric::new(sh.clone()))]
}

fn build_ram(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(RamMetric::new(sh.clone()))]
}

fn build_network(o: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    let ips = o.network_ips().unwrap_or_default();
    vec![Box::new(NetworkMetric::with_ips(sh.clone(), ips))]
}

/// Device verification always travels with the vendor-key fingerprint.
fn build_verify_devices(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![
        Box::new(VerifyMetric::new(sh.clone())),
        Box::new(AdbHashMetric::from_env(sh.clone())),
    ]
}

fn build_zombie(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(ZombieMetric::new(sh.clone()))]
}

fn build_process_time(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(ProcessTimeMetric::new(sh.clone()))]
}

fn build_cpu(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(CpuMetric::new(sh.clone()))]
}

fn build_disk_usage(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(DiskMetric::new(sh.clone()))]
}

fn build_uptime(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(UptimeMetric::new(sh.clone()))]
}

fn build_system_load(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(SystemLoadMetric::new(sh.clone()))]
}

fn build_name(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(NameMetric::new(sh.clone()))]
}

fn build_version(_: &Options, sh: &SharedShell) -> Vec<Box<dyn Metric>> {
    vec![Box::new(VersionMetric::new(sh.clone()))]
}

// ── 入口 ────────────────────────────────────────────────────────────────────

pub fn build_metrics(options: &Options, shell: &SharedShell) -> Vec<Box<dyn Metric>> {
    METRIC_TABLE
        .iter()
        .filter(|sel| (sel.selected)(options))
        .flat_map(|sel| {
            tracing::debug!(option = sel.option, "metric selected");
            (sel.build)(options, shell)
        })
        .collect()
}

pub fn build_checker(options: &Options) -> Result<HealthChecker> {
    let checker = match &options.health_config {
        Some(path) => HealthChecker::from_file(path)?,
        None => HealthChecker::with_default_policy(),
    };
    for (metric, analyzer) in checker.bindings() {
        tracing::debug!(metric, analyzer = %analyzer, "health rule");
    }
    Ok(checker)
}

pub fn build_reporters(options: &Options, checker: Rc<HealthChecker>) -> Vec<Box<dyn Reporter>> {
    options
        .reporters()
        .into_iter()
        .map(|kind| -> Box<dyn Reporter> {
            match kind {
                ReporterKind::Logger => Box::new(LoggerReporter::new(checker.clone())),
                ReporterKind::Json => Box::new(JsonReporter::new(checker.clone(), options.output_path())),
            }
        })
        .collect()
}

/// Fails only on configuration problems, before any metric runs.
pub fn build_runner(options: &Options, shell: SharedShell) -> Result<Runner> {
    let checker = Rc::new(build_checker(options)?);
    let metrics = build_metrics(options, &shell);
    let reporters = build_reporters(options, checker);
    Ok(Runner::new(metrics, reporters))
}
