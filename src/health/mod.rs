pub mod analyzer;
pub mod checker;

pub use analyzer::Analyzer;
pub use checker::{HealthChecker, HealthPolicy};
