// src/report/mod.rs
use crate::check::CheckConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Overall verdict across all registered checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Healthy,
    PartiallyUnhealthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Up,
    Down,
}

/// Outcome of one check execution. Duration is recorded for observability
/// only and never feeds into the aggregate verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

impl CheckResult {
    pub fn up(duration: Duration) -> Self {
        Self {
            status: CheckStatus::Up,
            error: None,
            timestamp: Utc::now(),
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn down(error: impl Into<String>, duration: Duration) -> Self {
        Self {
            status: CheckStatus::Down,
            error: Some(error.into()),
            timestamp: Utc::now(),
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn is_down(&self) -> bool {
        self.status == CheckStatus::Down
    }
}

/// The response payload: one overall status plus a keyed detail map.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub status: Status,
    pub details: HashMap<String, CheckResult>,
}

impl AggregateReport {
    pub fn healthy() -> Self {
        Self {
            status: Status::Healthy,
            details: HashMap::new(),
        }
    }
}

/// Reduces per-check outcomes and the configured skip policy into one report.
/// Pure and deterministic: unhealthy iff any hard-required check is down,
/// partially unhealthy iff only skippable checks are down, healthy otherwise
/// (including the zero-checks case). A result whose name is no longer
/// registered counts as hard-required.
pub fn aggregate(results: HashMap<String, CheckResult>, configs: &[CheckConfig]) -> AggregateReport {
    let skippable: HashSet<&str> = configs
        .iter()
        .filter(|c| c.skip_on_err)
        .map(|c| c.name.as_str())
        .collect();

    let mut status = Status::Healthy;
    for (name, result) in &results {
        if !result.is_down() {
            continue;
        }
        if skippable.contains(name.as_str()) {
            if status == Status::Healthy {
                status = Status::PartiallyUnhealthy;
            }
        } else {
            status = Status::Unhealthy;
        }
    }

    AggregateReport {
        status,
        details: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_fn;
    use proptest::prelude::*;

    fn config(name: &str, skip_on_err: bool) -> CheckConfig {
        CheckConfig::new(name, check_fn(|| async { anyhow::Ok(()) })).skip_on_err(skip_on_err)
    }

    fn result(up: bool) -> CheckResult {
        if up {
            CheckResult::up(Duration::from_millis(1))
        } else {
            CheckResult::down("boom", Duration::from_millis(1))
        }
    }

    #[test]
    fn empty_registry_is_healthy() {
        let report = aggregate(HashMap::new(), &[]);
        assert_eq!(report.status, Status::Healthy);
        assert!(report.details.is_empty());
    }

    #[test]
    fn hard_failure_wins_over_skippable_failure() {
        let configs = vec![config("a", false), config("b", true)];
        let results = HashMap::from([
            ("a".to_string(), result(false)),
            ("b".to_string(), result(false)),
        ]);
        assert_eq!(aggregate(results, &configs).status, Status::Unhealthy);
    }

    #[test]
    fn skippable_failure_degrades_to_partially_unhealthy() {
        let configs = vec![config("a", false), config("b", true)];
        let results = HashMap::from([
            ("a".to_string(), result(true)),
            ("b".to_string(), result(false)),
        ]);
        assert_eq!(aggregate(results, &configs).status, Status::PartiallyUnhealthy);
    }

    #[test]
    fn unknown_result_name_counts_as_hard_required() {
        let results = HashMap::from([("ghost".to_string(), result(false))]);
        assert_eq!(aggregate(results, &[]).status, Status::Unhealthy);
    }

    #[test]
    fn wire_format_matches_contract() {
        let configs = vec![config("db", true)];
        let results = HashMap::from([("db".to_string(), result(false))]);
        let json = serde_json::to_value(aggregate(results, &configs)).unwrap();

        assert_eq!(json["status"], "partiallyUnhealthy");
        assert_eq!(json["details"]["db"]["status"], "down");
        assert_eq!(json["details"]["db"]["error"], "boom");
        // chrono serializes DateTime<Utc> as RFC 3339
        let ts = json["details"]["db"]["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());

        let up = serde_json::to_value(CheckResult::up(Duration::from_millis(2))).unwrap();
        assert_eq!(up["status"], "up");
        assert!(up.get("error").is_none(), "error is omitted when up");
    }

    proptest! {
        // Status derivation over arbitrary combinations of up/down and
        // skip-on-err flags.
        #[test]
        fn status_follows_skip_policy(flags in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..16)) {
            let mut configs = Vec::new();
            let mut results = HashMap::new();
            for (i, (up, skip)) in flags.iter().enumerate() {
                let name = format!("check-{i}");
                configs.push(config(&name, *skip));
                results.insert(name, result(*up));
            }

            let report = aggregate(results, &configs);

            let hard_down = flags.iter().any(|(up, skip)| !up && !skip);
            let soft_down = flags.iter().any(|(up, skip)| !up && *skip);
            let expected = if hard_down {
                Status::Unhealthy
            } else if soft_down {
                Status::PartiallyUnhealthy
            } else {
                Status::Healthy
            };
            prop_assert_eq!(report.status, expected);
        }
    }
}
