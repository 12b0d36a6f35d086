use crate::infrastructure::monitoring::QueryMonitor;
use std::sync::Arc;
use std::time::Duration;

pub struct StatsReporter {
    monitor: Arc<QueryMonitor>,
    interval_seconds: u64,
}
impl StatsReporter {
    pub fn new(monitor: Arc<QueryMonitor>, interval_seconds: u64) -> Self {
        Self {
            monitor,
            interval_seconds,
        }
    }
    pub async fn start(&self) {
        loop {
            tokio::time::sleep(Duration::from_secs(self.interval_seconds)).await;

            let report = self.monitor.health().await;
            tracing::info!(
                status = ?report.status,
                total = report.metrics.total_queries,
                slow = report.metrics.slow_queries,
                avg_ms = report.metrics.avg_duration_ms,
                p95_ms = report.metrics.p95_duration_ms,
                "query performance summary: {}",
                report.message
            );

            if self.monitor.is_degraded().await {
                tracing::warn!("query performance degraded over the trailing window");
            }
        }
    }
}
