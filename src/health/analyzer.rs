//! Single-field health predicates

use serde::{Deserialize, Serialize};

use crate::utils::{MetricResult, Value};

/// A judgement over one field of a metric result.
///
/// Equality is over (variant, key, constant), which is what lets the
/// checker collapse duplicate registrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "compare", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Analyzer {
    /// `result[key] > constant`
    GreaterThan { key: String, constant: f64 },
    /// `result[key] < constant`
    LessThan { key: String, constant: f64 },
    /// `result[key] == constant`; ints and floats compare numerically
    Equals { key: String, constant: Value },
    /// `result[key]` is a string beginning with `constant`
    StartsWith { key: String, constant: String },
}

impl Analyzer {
    pub fn greater_than(key: impl Into<String>, constant: f64) -> Self {
        Analyzer::GreaterThan { key: key.into(), constant }
    }

    pub fn less_than(key: impl Into<String>, constant: f64) -> Self {
        Analyzer::LessThan { key: key.into(), constant }
    }

    pub fn equals(key: impl Into<String>, constant: impl Into<Value>) -> Self {
        Analyzer::Equals { key: key.into(), constant: constant.into() }
    }

    pub fn starts_with(key: impl Into<String>, constant: impl Into<String>) -> Self {
        Analyzer::StartsWith { key: key.into(), constant: constant.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Analyzer::GreaterThan { key, .. }
            | Analyzer::LessThan { key, .. }
            | Analyzer::Equals { key, .. }
            | Analyzer::StartsWith { key, .. } => key,
        }
    }

    /// Missing keys, nulls and type mismatches are all unhealthy.
    pub fn is_healthy(&self, result: &MetricResult) -> bool {
        let value = match result.get(self.key()) {
            Some(v) if !v.is_null() => v,
            _ => return false,
        };

        match self {
            Analyzer::GreaterThan { constant, .. } => value.as_f64().map_or(false, |v| v > *constant),
            Analyzer::LessThan { constant, .. } => value.as_f64().map_or(false, |v| v < *constant),
            Analyzer::Equals { constant, .. } => match (value.as_f64(), constant.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => value == constant,
            },
            Analyzer::StartsWith { constant, .. } => value.as_str().map_or(false, |s| s.starts_with(constant.as_str())),
        }
    }
}

impl std::fmt::Display for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Analyzer::GreaterThan { key, constant } => write!(f, "{} > {}", key, constant),
            Analyzer::LessThan { key, constant } => write!(f, "{} < {}", key, constant),
            Analyzer::Equals { key, constant } => write!(f, "{} == {}", key, constant),
            Analyzer::StartsWith { key, constant } => write!(f, "{} starts with {:?}", key, constant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> MetricResult {
        [
            ("free", Value::Int(29717)),
            ("rate", Value::Float(1.5)),
            ("name", Value::from("chromeos1-row2")),
            ("gone", Value::Null),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn comparisons() {
        let r = result();
        assert!(Analyzer::greater_than("free", 100.0).is_healthy(&r));
        assert!(!Analyzer::greater_than("free", 29717.0).is_healthy(&r));
        assert!(Analyzer::less_than("rate", 2.0).is_healthy(&r));
        assert!(Analyzer::equals("free", 29717.0).is_healthy(&r));
        assert!(Analyzer::equals("name", "chromeos1-row2").is_healthy(&r));
        assert!(Analyzer::starts_with("name", "chromeos1").is_healthy(&r));
        assert!(!Analyzer::starts_with("name", "chromeos2").is_healthy(&r));
    }

    #[test]
    fn missing_null_and_mismatch_are_unhealthy() {
        let r = result();
        assert!(!Analyzer::greater_than("absent", 0.0).is_healthy(&r));
        assert!(!Analyzer::less_than("gone", 1.0).is_healthy(&r));
        assert!(!Analyzer::equals("gone", Value::Null).is_healthy(&r));
        assert!(!Analyzer::greater_than("name", 0.0).is_healthy(&r));
        assert!(!Analyzer::starts_with("free", "2").is_healthy(&r));
    }

    #[test]
    fn equality_is_kind_key_constant() {
        assert_eq!(Analyzer::less_than("k", 1.0), Analyzer::less_than("k", 1.0));
        assert_ne!(Analyzer::less_than("k", 1.0), Analyzer::greater_than("k", 1.0));
        assert_ne!(Analyzer::less_than("k", 1.0), Analyzer::less_than("j", 1.0));
        assert_ne!(Analyzer::less_than("k", 1.0), Analyzer::less_than("k", 2.0));
    }

    #[test]
    fn deserializes_from_policy_rule() {
        let a: Analyzer = serde_json::from_str(r#"{"compare": "LESS_THAN", "key": "total_unhealthy", "constant": 1}"#).unwrap();
        assert_eq!(a, Analyzer::less_than("total_unhealthy", 1.0));
        let a: Analyzer = serde_json::from_str(r#"{"compare": "STARTS_WITH", "key": "hostname_prefix", "constant": "chromeos"}"#).unwrap();
        assert_eq!(a, Analyzer::starts_with("hostname_prefix", "chromeos"));
    }
}
