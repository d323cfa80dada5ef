// src/runner/mod.rs
use crate::check::CheckConfig;
use crate::registry::Registry;
use crate::report::CheckResult;
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Scheduling slack added on top of the largest per-check deadline before
/// the join gives up on unfinished tasks.
const JOIN_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
#[error("check timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// Executes every registered check concurrently, each under its own
/// deadline. One task per check, each writing exactly one slot of the shared
/// result map, so a slow or hung check never delays the others.
pub struct Runner {
    default_timeout: Duration,
    max_wait: Option<Duration>,
}

impl Runner {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            max_wait: None,
        }
    }

    /// Overrides the overall ceiling, which otherwise tracks the largest
    /// per-check deadline.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Fan out over a registry snapshot, fan back in at a bounded join.
    /// Checks that have not reported by the ceiling are recorded as timed
    /// out; their tasks are abandoned, not awaited, and stop on their own
    /// when their per-check deadline expires. Dropping the returned future
    /// (client disconnect) abandons the wait the same way.
    pub async fn run_all(&self, registry: &Registry) -> HashMap<String, CheckResult> {
        let configs = registry.list();
        let results: Arc<DashMap<String, CheckResult>> = Arc::new(DashMap::new());
        let mut tasks = Vec::with_capacity(configs.len());
        let mut ceiling = Duration::ZERO;

        for config in &configs {
            let deadline = self.deadline_for(config);
            ceiling = ceiling.max(deadline);

            let results = Arc::clone(&results);
            let config = config.clone();
            tasks.push(tokio::spawn(async move {
                let result = run_one(&config, deadline).await;
                results.insert(config.name.clone(), result);
            }));
        }

        let ceiling = self.max_wait.unwrap_or(ceiling + JOIN_GRACE);
        if timeout(ceiling, join_all(tasks)).await.is_err() {
            warn!(?ceiling, "health check join exceeded ceiling, abandoning unfinished checks");
        }

        let mut out = HashMap::with_capacity(configs.len());
        for config in configs {
            let deadline = self.deadline_for(&config);
            let result = match results.remove(&config.name) {
                Some((_, result)) => result,
                None => CheckResult::down(TimeoutError(deadline).to_string(), deadline),
            };
            out.insert(config.name, result);
        }
        out
    }

    fn deadline_for(&self, config: &CheckConfig) -> Duration {
        config.timeout.unwrap_or(self.default_timeout)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

async fn run_one(config: &CheckConfig, deadline: Duration) -> CheckResult {
    let start = Instant::now();
    match timeout(deadline, config.check.check()).await {
        Ok(Ok(())) => {
            debug!(name = %config.name, "check passed");
            CheckResult::up(start.elapsed())
        }
        Ok(Err(err)) => {
            warn!(name = %config.name, %err, "check failed");
            CheckResult::down(err.to_string(), start.elapsed())
        }
        Err(_) => {
            warn!(name = %config.name, ?deadline, "check timed out");
            CheckResult::down(TimeoutError(deadline).to_string(), deadline)
        }
    }
}
