// src/metrics/collector.rs
use crate::report::{AggregateReport, CheckStatus, Status};
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        buffer
    }
}

/// Instantaneous health gauges only; history belongs to the scraper.
pub struct MetricsCollector {
    pub check_up: IntGaugeVec,
    pub check_duration_seconds: HistogramVec,
    pub checks_total: IntCounterVec,
    pub aggregate_status: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let check_up = IntGaugeVec::new(
            Opts::new("health_check_up", "Check status (1=up, 0=down)"),
            &["check"],
        )?;
        registry.register(Box::new(check_up.clone()))?;

        let check_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "health_check_duration_seconds",
                "Check execution duration in seconds",
            ),
            &["check"],
        )?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        let checks_total = IntCounterVec::new(
            Opts::new("health_checks_total", "Total check executions"),
            &["check", "status"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        let aggregate_status = IntGauge::new(
            "health_status",
            "Aggregate status (0=healthy, 1=partially unhealthy, 2=unhealthy)",
        )?;
        registry.register(Box::new(aggregate_status.clone()))?;

        Ok(Self {
            check_up,
            check_duration_seconds,
            checks_total,
            aggregate_status,
        })
    }

    pub fn observe_report(&self, report: &AggregateReport) {
        for (name, result) in &report.details {
            let up = result.status == CheckStatus::Up;
            self.check_up
                .with_label_values(&[name.as_str()])
                .set(if up { 1 } else { 0 });
            self.check_duration_seconds
                .with_label_values(&[name.as_str()])
                .observe(result.duration_ms as f64 / 1000.0);
            self.checks_total
                .with_label_values(&[name.as_str(), if up { "up" } else { "down" }])
                .inc();
        }

        self.aggregate_status.set(match report.status {
            Status::Healthy => 0,
            Status::PartiallyUnhealthy => 1,
            Status::Unhealthy => 2,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CheckResult;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn observes_per_check_and_aggregate_state() {
        let metrics = MetricsRegistry::new().unwrap();
        let report = AggregateReport {
            status: Status::Unhealthy,
            details: HashMap::from([
                ("db".to_string(), CheckResult::down("boom", Duration::from_millis(5))),
                ("api".to_string(), CheckResult::up(Duration::from_millis(2))),
            ]),
        };

        metrics.collector().observe_report(&report);

        let text = String::from_utf8(metrics.gather()).unwrap();
        assert!(text.contains("health_check_up{check=\"db\"} 0"));
        assert!(text.contains("health_check_up{check=\"api\"} 1"));
        assert!(text.contains("health_status 2"));
    }
}
