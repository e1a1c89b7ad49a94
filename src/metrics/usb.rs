//! Bytes moved per USB device over a sampling window
//! Source: lsusb, /sys/kernel/debug/usb/usbmon/0u (root only)

use std::collections::HashMap;
use std::time::Duration;

use crate::shell::ShellError;
use crate::utils::{MetricResult, OrderedMap, Value};

use super::{parse_field, GatherError, GatherResult, Metric, SharedShell};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);
const USBMON_PATH: &str = "/sys/kernel/debug/usb/usbmon/0u";
const LOAD_USBMON: &str = "grep -q usbmon /proc/modules || modprobe usbmon";
/// Extra time granted to the shell on top of the sampling window.
const SAMPLE_GRACE: Duration = Duration::from_secs(10);
/// Status `timeout` exits with once the window closes.
const EXIT_WINDOW_CLOSED: i32 = 124;

pub const DEVICES: &str = "devices";

#[derive(Debug, Clone, PartialEq)]
pub struct UsbDevice {
    pub name: String,
    pub dev_id: String,
    pub trans_bytes: i64,
}

impl From<UsbDevice> for Value {
    fn from(d: UsbDevice) -> Self {
        let mut obj = OrderedMap::new();
        obj.insert("name", Value::Str(d.name));
        obj.insert("dev_id", Value::Str(d.dev_id));
        obj.insert("trans_bytes", Value::Int(d.trans_bytes));
        Value::Object(obj)
    }
}

pub struct UsbMetric {
    shell: SharedShell,
    window: Duration,
}

impl UsbMetric {
    pub fn new(shell: SharedShell) -> Self {
        Self::with_window(shell, DEFAULT_WINDOW)
    }

    pub fn with_window(shell: SharedShell, window: Duration) -> Self {
        Self { shell, window }
    }

    fn sample_command(&self) -> String {
        format!("timeout {} cat {}", self.window.as_secs().max(1), USBMON_PATH)
    }

    /// Total callback bytes per `bus:dev` seen during the window.
    fn sample(&self) -> GatherResult<HashMap<String, i64>> {
        if let Err(e) = self.shell.run_ignoring_status(LOAD_USBMON) {
            tracing::debug!(error = %e, "usbmon module check failed");
        }
        let command = self.sample_command();
        let out = self.shell.run_with(&command, self.window + SAMPLE_GRACE, true)?;
        // anything but a clean EOF or the window closing means no capture happened
        if out.exit_status != 0 && out.exit_status != EXIT_WINDOW_CLOSED {
            return Err(ShellError::CommandFailed { command, result: out }.into());
        }
        Ok(parse_usbmon(&out.stdout))
    }
}

impl Metric for UsbMetric {
    fn type_name(&self) -> &'static str {
        "UsbMetric"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[DEVICES]
    }

    fn measure(&self) -> GatherResult<MetricResult> {
        let mut result = MetricResult::new();
        if self.shell.effective_uid() != 0 {
            return Ok(result);
        }

        let traffic = self.sample()?;
        // list devices after sampling so anything unplugged meanwhile drops out
        let lsusb = self.shell.run("lsusb")?;
        let devices = parse_lsusb(&lsusb.stdout)?
            .into_iter()
            .map(|(dev_id, name)| UsbDevice {
                trans_bytes: traffic.get(&dev_id).copied().unwrap_or(0),
                name,
                dev_id,
            })
            .collect::<Vec<_>>();

        result.insert(DEVICES, Value::from(devices));
        Ok(result)
    }
}

/// `Bus 001 Device 002: ID 8087:0024 Intel Corp. Hub` → (`1:2`, `Intel Corp. Hub`)
fn parse_lsusb(stdout: &str) -> GatherResult<Vec<(String, String)>> {
    let mut devices = Vec::new();
    for line in stdout.lines().filter(|l| l.starts_with("Bus ")) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 6 {
            return Err(GatherError::Parse(format!("lsusb: {:?}", line)));
        }
        let bus: u32 = parse_field(tokens[1], "lsusb bus")?;
        let dev: u32 = parse_field(tokens[3].trim_end_matches(':'), "lsusb device")?;
        let name = tokens[6..].join(" ");
        devices.push((format!("{}:{}", bus, dev), name));
    }
    Ok(devices)
}

/// usbmon text lines: `tag timestamp event address status length ...` where
/// address is `<type><dir>:<bus>:<dev>:<ep>`. Only completions (`C`) count.
fn parse_usbmon(stdout: &str) -> HashMap<String, i64> {
    let mut bytes = HashMap::new();
    for line in stdout.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 || fields[2] != "C" {
            continue;
        }
        let addr: Vec<&str> = fields[3].split(':').collect();
        if addr.len() < 3 {
            continue;
        }
        let (bus, dev, len) = match (
            addr[1].parse::<u32>(),
            addr[2].parse::<u32>(),
            fields[5].parse::<i64>(),
        ) {
            (Ok(b), Ok(d), Ok(l)) => (b, d, l),
            _ => continue,
        };
        *bytes.entry(format!("{}:{}", bus, dev)).or_insert(0) += len;
    }
    bytes
}
