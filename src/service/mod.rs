// src/service/mod.rs
use crate::cache::ResultCache;
use crate::metrics::MetricsCollector;
use crate::registry::Registry;
use crate::report::{aggregate, AggregateReport};
use crate::runner::Runner;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Ties the pieces together: snapshots the registry, fans the checks out
/// through the runner, reduces the outcomes to a report, and optionally
/// throttles the whole cycle behind a result cache.
pub struct HealthService {
    registry: Arc<Registry>,
    runner: Runner,
    cache: Option<ResultCache>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HealthService {
    pub fn new(registry: Arc<Registry>, runner: Runner) -> Self {
        Self {
            registry,
            runner,
            cache: None,
            metrics: None,
        }
    }

    /// Serve a cached report for requests arriving faster than `interval`.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.cache = Some(ResultCache::new(interval));
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Current aggregate report, recomputed or served from cache depending
    /// on policy.
    pub async fn report(&self) -> AggregateReport {
        match &self.cache {
            Some(cache) => cache.get_or_refresh(|| self.evaluate()).await,
            None => self.evaluate().await,
        }
    }

    async fn evaluate(&self) -> AggregateReport {
        let results = self.runner.run_all(&self.registry).await;
        let report = aggregate(results, &self.registry.list());

        if let Some(metrics) = &self.metrics {
            metrics.observe_report(&report);
        }
        info!(
            status = ?report.status,
            checks = report.details.len(),
            "health evaluation complete"
        );
        report
    }
}
