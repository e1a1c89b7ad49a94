//! JSON file report
//! Layout: metric → fields + `is_healthy`, then `total_unhealthy`.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;

use crate::health::HealthChecker;
use crate::utils::{LabHealthError, OrderedMap, Result, ResultsMap, Value};

use super::Reporter;

pub const DEFAULT_OUTPUT: &str = "output.json";
pub const IS_HEALTHY: &str = "is_healthy";
pub const TOTAL_UNHEALTHY: &str = "total_unhealthy";

pub struct JsonReporter {
    checker: Rc<HealthChecker>,
    path: PathBuf,
}

impl JsonReporter {
    pub fn new(checker: Rc<HealthChecker>, path: impl Into<PathBuf>) -> Self {
        Self { checker, path: path.into() }
    }

    /// Annotated copy of `results`; the caller's map is left as is.
    pub fn document(&self, results: &ResultsMap) -> OrderedMap<OrderedMap<Value>> {
        let verdict = self.checker.unhealthy(results);
        let mut doc = OrderedMap::new();

        for (metric, result) in results.iter() {
            let mut annotated = result.clone();
            annotated.insert(IS_HEALTHY, Value::Bool(!verdict.iter().any(|m| m == metric)));
            doc.insert(metric, annotated);
        }

        let mut summary = OrderedMap::new();
        summary.insert(TOTAL_UNHEALTHY, Value::from(verdict.len()));
        doc.insert(TOTAL_UNHEALTHY, summary);
        doc
    }

    fn write(&self, results: &ResultsMap) -> std::result::Result<(), String> {
        let file = File::create(&self.path).map_err(|e| format!("create {}: {}", self.path.display(), e))?;
        let mut out = BufWriter::new(file);

        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.document(results)
            .serialize(&mut ser)
            .map_err(|e| format!("JSON serialize: {}", e))?;

        out.write_all(b"\n")
            .and_then(|_| out.flush())
            .map_err(|e| format!("write {}: {}", self.path.display(), e))
    }
}

impl Reporter for JsonReporter {
    fn name(&self) -> &str {
        "json"
    }

    fn report(&self, results: &ResultsMap) -> Result<()> {
        tracing::debug!(metrics = ?results.keys().collect::<Vec<_>>(), "serializing report");
        self.write(results).map_err(|reason| LabHealthError::Reporter {
            reporter: self.name().to_string(),
            reason,
        })?;
        tracing::info!(path = %self.path.display(), "wrote JSON report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Analyzer;
    use crate::utils::MetricResult;
    use std::fs;

    fn ram() -> MetricResult {
        [
            ("total", Value::Int(64350)),
            ("used", Value::Int(34633)),
            ("free", Value::Int(29717)),
            ("buffers", Value::Int(1744)),
            ("cached", Value::Int(24692)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn empty_run_has_only_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let reporter = JsonReporter::new(Rc::new(HealthChecker::new()), &path);
        reporter.report(&ResultsMap::new()).unwrap();

        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"total_unhealthy": {"total_unhealthy": 0}}));
    }

    #[test]
    fn annotates_health_and_indents_four_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let mut checker = HealthChecker::new();
        checker.register("verify", Analyzer::less_than("total_unhealthy", 1.0));
        let reporter = JsonReporter::new(Rc::new(checker), &path);

        let mut results = ResultsMap::new();
        results.insert("ram", ram());
        results.insert("verify", [("total_unhealthy", Value::Int(2))].into_iter().collect::<MetricResult>());
        let before = results.clone();
        reporter.report(&results).unwrap();
        assert_eq!(results, before);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"ram\": {\n        \"total\": 64350,"));

        let back: ResultsMap = serde_json::from_str(&text).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["ram", "verify", "total_unhealthy"]);

        let mut expected_ram = ram();
        expected_ram.insert(IS_HEALTHY, Value::Bool(true));
        assert_eq!(back.get("ram"), Some(&expected_ram));
        assert_eq!(back.get("verify").and_then(|v| v.get(IS_HEALTHY)), Some(&Value::Bool(false)));
        assert_eq!(
            back.get(TOTAL_UNHEALTHY).and_then(|v| v.get(TOTAL_UNHEALTHY)),
            Some(&Value::Int(1))
        );
    }

    #[test]
    fn unwritable_path_is_reporter_error() {
        let reporter = JsonReporter::new(Rc::new(HealthChecker::new()), "/no/such/dir/out.json");
        assert!(matches!(
            reporter.report(&ResultsMap::new()),
            Err(LabHealthError::Reporter { .. })
        ));
    }
}
