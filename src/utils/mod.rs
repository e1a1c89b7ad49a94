pub mod error;
pub mod types;

pub use error::{LabHealthError, Result};
pub use types::{MetricResult, OrderedMap, ResultsMap, Value};
