// src/cache/mod.rs
use crate::report::AggregateReport;
use arc_swap::ArcSwapOption;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct CachedReport {
    report: AggregateReport,
    computed_at: Instant,
}

/// Throttles recomputation to at most once per `min_interval`, with at most
/// one recompute in flight. Readers are lock-free; a request that loses the
/// race for the refresh lock is served the stale snapshot instead of
/// queueing behind the recompute. The only request that ever waits is a
/// cold-start one, when there is no snapshot to serve yet.
pub struct ResultCache {
    min_interval: Duration,
    entry: ArcSwapOption<CachedReport>,
    refresh: Mutex<()>,
}

impl ResultCache {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            entry: ArcSwapOption::const_empty(),
            refresh: Mutex::new(()),
        }
    }

    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> AggregateReport
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AggregateReport>,
    {
        if let Some(report) = self.fresh() {
            return report;
        }

        match self.refresh.try_lock() {
            Ok(_guard) => {
                // A refresh that finished while we raced for the lock counts.
                if let Some(report) = self.fresh() {
                    return report;
                }
                debug!("refreshing cached health report");
                let report = refresh().await;
                self.store(report.clone());
                report
            }
            Err(_) => {
                if let Some(entry) = self.entry.load_full() {
                    debug!("refresh in flight, serving stale health report");
                    return entry.report.clone();
                }
                // Cold start: wait for the first refresh to land.
                let _guard = self.refresh.lock().await;
                if let Some(entry) = self.entry.load_full() {
                    return entry.report.clone();
                }
                let report = refresh().await;
                self.store(report.clone());
                report
            }
        }
    }

    fn fresh(&self) -> Option<AggregateReport> {
        let entry = self.entry.load_full()?;
        if entry.computed_at.elapsed() < self.min_interval {
            Some(entry.report.clone())
        } else {
            None
        }
    }

    fn store(&self, report: AggregateReport) {
        self.entry.store(Some(Arc::new(CachedReport {
            report,
            computed_at: Instant::now(),
        })));
    }
}
