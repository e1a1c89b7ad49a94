//! Report sinks
//! Each reporter asks its health checker for the verdict and writes one report.

pub mod json;
pub mod logger;

use crate::utils::{Result, ResultsMap};

pub use json::JsonReporter;
pub use logger::LoggerReporter;

pub trait Reporter {
    fn name(&self) -> &str;

    /// Write one report. `results` is read-only; annotate a copy if needed.
    fn report(&self, results: &ResultsMap) -> Result<()>;
}
