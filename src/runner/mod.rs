//! Sequential orchestration of one health pass

pub mod config;
pub mod factory;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::metrics::Metric;
use crate::reporters::Reporter;
use crate::utils::{LabHealthError, Result, ResultsMap};

pub struct Runner {
    metrics: Vec<Box<dyn Metric>>,
    reporters: Vec<Box<dyn Reporter>>,
    interrupted: Arc<AtomicBool>,
}

impl Runner {
    pub fn new(metrics: Vec<Box<dyn Metric>>, reporters: Vec<Box<dyn Reporter>>) -> Self {
        Self {
            metrics,
            reporters,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked before each metric and before reporting; once set the run
    /// aborts without reporting.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    pub fn reporter_names(&self) -> Vec<&str> {
        self.reporters.iter().map(|r| r.name()).collect()
    }

    /// Gather every metric in order, then hand the results to every reporter.
    ///
    /// A failing reporter is logged and skipped. Duplicate metric names and an
    /// interrupt are errors and stop the run before any report is written.
    pub fn run(&self) -> Result<ResultsMap> {
        info!(metrics = ?self.metric_names(), reporters = ?self.reporter_names(), "starting health run");
        let results = self.gather()?;
        // a signal that lands during the last metric must still suppress reports
        self.check_interrupt()?;
        info!(gathered = results.len(), "all metrics gathered");

        for reporter in &self.reporters {
            if let Err(e) = reporter.report(&results) {
                error!(reporter = reporter.name(), error = %e, "reporter failed, skipping");
            }
        }

        Ok(results)
    }

    fn gather(&self) -> Result<ResultsMap> {
        let mut results = ResultsMap::new();

        for metric in &self.metrics {
            self.check_interrupt()?;

            let name = metric.name();
            if results.contains_key(&name) {
                return Err(LabHealthError::Programming(format!("duplicate metric name `{}`", name)));
            }

            info!(metric = %name, "gathering");
            let start = Instant::now();
            let result = metric.gather();
            debug!(metric = %name, elapsed_ms = start.elapsed().as_millis() as u64, "gathered");

            results.insert(name, result);
        }

        Ok(results)
    }

    fn check_interrupt(&self) -> Result<()> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(LabHealthError::Interrupted);
        }
        Ok(())
    }
}
