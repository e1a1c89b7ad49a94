//! Line-oriented report through the process log

use std::rc::Rc;
use tracing::{info, warn};

use crate::health::HealthChecker;
use crate::utils::{Result, ResultsMap};

use super::Reporter;

pub struct LoggerReporter {
    checker: Rc<HealthChecker>,
}

#[derive(Debug, PartialEq)]
pub enum Line {
    Info(String),
    Unhealthy(String),
}

impl LoggerReporter {
    pub fn new(checker: Rc<HealthChecker>) -> Self {
        Self { checker }
    }

    /// One line per field, then a verdict line, for every metric in run order.
    pub fn render(&self, results: &ResultsMap) -> Vec<Line> {
        let verdict = self.checker.unhealthy(results);
        let mut lines = Vec::new();

        for (metric, result) in results.iter() {
            for (key, value) in result.iter() {
                lines.push(Line::Info(format!("{}: {} = {}", metric, key, value)));
            }
            if verdict.iter().any(|m| m == metric) {
                let reasons = self.checker.reasons(metric, results);
                lines.push(Line::Unhealthy(format!("{}: UNHEALTHY: {}", metric, reasons.join("; "))));
            } else {
                lines.push(Line::Info(format!("{}: healthy", metric)));
            }
        }

        lines.push(Line::Info(format!("total unhealthy: {}", verdict.len())));
        lines
    }
}

impl Reporter for LoggerReporter {
    fn name(&self) -> &str {
        "logger"
    }

    fn report(&self, results: &ResultsMap) -> Result<()> {
        info!(
            "lab health report, collected at {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S %z")
        );
        for line in self.render(results) {
            match line {
                Line::Info(text) => info!("{}", text),
                Line::Unhealthy(text) => warn!("{}", text),
            }
        }
        Ok(())
    }
}
