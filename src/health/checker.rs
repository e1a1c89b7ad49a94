//! Analyzer registry and the per-run verdict

use std::fs;
use std::path::Path;

use crate::utils::{LabHealthError, OrderedMap, Result, ResultsMap};

use super::analyzer::Analyzer;

/// On-disk health policy: metric name → analyzers, in registration order.
pub type HealthPolicy = OrderedMap<Vec<Analyzer>>;

#[derive(Debug, Clone, Default)]
pub struct HealthChecker {
    bindings: Vec<(String, Analyzer)>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy used when no `health_config` is given.
    pub fn with_default_policy() -> Self {
        let mut checker = Self::new();
        checker.register("ram", Analyzer::greater_than("free", 100.0));
        checker.register("verify", Analyzer::less_than("total_unhealthy", 1.0));
        checker.register("zombie", Analyzer::less_than("num_adb_zombies", 1.0));
        checker.register("zombie", Analyzer::less_than("num_fastboot_zombies", 1.0));
        checker.register("disk", Analyzer::less_than("percent_used", 90.0));
        checker.register("cpu", Analyzer::less_than("cpu_percent", 95.0));
        checker
    }

    pub fn from_policy(policy: HealthPolicy) -> Self {
        let mut checker = Self::new();
        for (metric, analyzers) in policy.iter() {
            for analyzer in analyzers {
                checker.register(metric, analyzer.clone());
            }
        }
        checker
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            LabHealthError::Config(format!("cannot read health config {}: {}", path.display(), e))
        })?;
        let policy: HealthPolicy = serde_json::from_str(&raw).map_err(|e| {
            LabHealthError::Config(format!("invalid health config {}: {}", path.display(), e))
        })?;
        Ok(Self::from_policy(policy))
    }

    /// Duplicate (metric, analyzer) pairs collapse into the first registration.
    pub fn register(&mut self, metric: impl Into<String>, analyzer: Analyzer) {
        let metric = metric.into();
        if !self.bindings.iter().any(|(m, a)| *m == metric && *a == analyzer) {
            self.bindings.push((metric, analyzer));
        }
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Analyzer)> {
        self.bindings.iter().map(|(m, a)| (m.as_str(), a))
    }

    /// Metrics present in `results` that fail any bound analyzer, deduplicated,
    /// in registration order.
    pub fn unhealthy(&self, results: &ResultsMap) -> Vec<String> {
        let mut verdict: Vec<String> = Vec::new();
        for (metric, analyzer) in &self.bindings {
            if verdict.contains(metric) {
                continue;
            }
            if let Some(result) = results.get(metric) {
                if !analyzer.is_healthy(result) {
                    verdict.push(metric.clone());
                }
            }
        }
        verdict
    }

    /// Human-readable reasons `metric` failed, e.g. `total_unhealthy < 1 (got 2)`.
    pub fn reasons(&self, metric: &str, results: &ResultsMap) -> Vec<String> {
        let result = match results.get(metric) {
            Some(r) => r,
            None => return Vec::new(),
        };
        self.bindings
            .iter()
            .filter(|(m, a)| m == metric && !a.is_healthy(result))
            .map(|(_, a)| {
                let got = result.get(a.key()).map_or("missing".to_string(), |v| v.to_string());
                format!("{} (got {})", a, got)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{MetricResult, Value};
    use std::io::Write;

    fn results() -> ResultsMap {
        let mut results = ResultsMap::new();
        results.insert("verify", [("total_unhealthy", Value::Int(2))].into_iter().collect::<MetricResult>());
        results.insert("ram", [("free", Value::Int(29717))].into_iter().collect::<MetricResult>());
        results.insert("zombie", [("num_adb_zombies", Value::Int(1))].into_iter().collect::<MetricResult>());
        results
    }

    #[test]
    fn verdict_in_registration_order() {
        let mut checker = HealthChecker::new();
        checker.register("zombie", Analyzer::less_than("num_adb_zombies", 1.0));
        checker.register("ram", Analyzer::greater_than("free", 100.0));
        checker.register("verify", Analyzer::less_than("total_unhealthy", 1.0));
        checker.register("zombie", Analyzer::less_than("num_fastboot_zombies", 1.0));
        assert_eq!(checker.unhealthy(&results()), vec!["zombie", "verify"]);
    }

    #[test]
    fn duplicates_collapse() {
        let mut checker = HealthChecker::new();
        checker.register("verify", Analyzer::less_than("total_unhealthy", 1.0));
        checker.register("verify", Analyzer::less_than("total_unhealthy", 1.0));
        checker.register("verify", Analyzer::less_than("total_unhealthy", 3.0));
        assert_eq!(checker.bindings().count(), 2);
    }

    #[test]
    fn absent_metrics_are_ignored_and_input_untouched() {
        let checker = HealthChecker::with_default_policy();
        let results = results();
        let before = results.clone();
        let verdict = checker.unhealthy(&results);
        assert_eq!(verdict, vec!["verify", "zombie"]);
        assert_eq!(verdict, checker.unhealthy(&results));
        assert_eq!(results, before);
    }

    #[test]
    fn reasons_name_the_failed_analyzer() {
        let checker = HealthChecker::with_default_policy();
        assert_eq!(checker.reasons("verify", &results()), vec!["total_unhealthy < 1 (got 2)"]);
        assert!(checker.reasons("ram", &results()).is_empty());
    }

    #[test]
    fn policy_file_loads_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "ram": [{{"compare": "GREATER_THAN", "key": "free", "constant": 50000}}],
                "verify": [{{"compare": "EQUALS", "key": "total_unhealthy", "constant": 2}}]
            }}"#
        )
        .unwrap();
        let checker = HealthChecker::from_file(file.path()).unwrap();
        assert_eq!(checker.bindings().map(|(m, _)| m).collect::<Vec<_>>(), vec!["ram", "verify"]);
        assert_eq!(checker.unhealthy(&results()), vec!["ram"]);
    }

    #[test]
    fn bad_policy_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ram": [{{"compare": "BIGGER", "key": "free", "constant": 1}}]}}"#).unwrap();
        assert!(matches!(HealthChecker::from_file(file.path()), Err(LabHealthError::Config(_))));
        assert!(matches!(
            HealthChecker::from_file(Path::new("/no/such/policy.json")),
            Err(LabHealthError::Config(_))
        ));
    }
}
