//! Rolling query performance aggregation.
//!
//! The monitor owns the only mutable monitoring state in the process: a
//! bounded history of recent query records plus the window-start clock.
//! The database layer pushes one record per completed query; health
//! endpoints and dashboard handlers read aggregated statistics back out.

use super::log_format::{format_query_log_line, is_slow};
use super::pattern::normalize_query;
use super::traits::{SlowQuerySink, TracingSink};
use super::types::{HealthReport, HealthStatus, QueryRecord, QueryStats};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

/// Hard cap on retained records; oldest entries are evicted first.
pub const MAX_HISTORY: usize = 1000;

/// Window used for degradation detection and health classification.
const HEALTH_WINDOW_MS: u64 = 300_000;

/// Below this many queries in the health window, degradation is never
/// reported: low traffic produces too few samples to trust a ratio.
const MIN_DEGRADATION_SAMPLE: u64 = 10;

/// Default number of entries returned from the slow-query listing.
pub const DEFAULT_SLOW_QUERY_LIMIT: usize = 10;

/// Internal monitor state guarded by a single lock.
///
/// Writers (record, reset) and readers (stats, slow-query listing) are
/// mutually exclusive through it, so aggregation always sees a consistent
/// history in insertion order.
struct MonitorInner {
    history: VecDeque<QueryRecord>,
    window_start: DateTime<Utc>,
}

/// Stateful query performance monitor with process-scoped lifetime.
///
/// Constructed once at startup and shared by handle; there is no stopped
/// state, only an explicit [`reset`](QueryMonitor::reset) that clears
/// history and restarts the window clock.
pub struct QueryMonitor {
    inner: Arc<RwLock<MonitorInner>>,

    /// Slow classification threshold, fixed at construction
    threshold_ms: u64,

    /// Destination for slow-query warning blocks
    sink: Arc<dyn SlowQuerySink>,
}

impl QueryMonitor {
    /// Creates a monitor that reports slow queries through `tracing`.
    pub fn new(threshold_ms: u64) -> Self {
        Self::with_sink(threshold_ms, Arc::new(TracingSink))
    }

    /// Creates a monitor with a custom slow-query sink.
    pub fn with_sink(threshold_ms: u64, sink: Arc<dyn SlowQuerySink>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MonitorInner {
                history: VecDeque::with_capacity(MAX_HISTORY),
                window_start: Utc::now(),
            })),
            threshold_ms,
            sink,
        }
    }

    /// The configured slow-query threshold in milliseconds.
    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    /// Appends one query observation to the rolling history.
    ///
    /// Never fails and never validates: records are stored as given. A slow
    /// record additionally emits a warning block through the sink before the
    /// append; the sink contract keeps that emission from ever blocking or
    /// failing the call.
    #[instrument(skip(self, record), fields(duration_ms = record.duration_ms))]
    pub async fn record_query(&self, record: QueryRecord) {
        if is_slow(record.duration_ms, self.threshold_ms) {
            self.sink
                .emit(&slow_query_warning(&record, self.threshold_ms));
        }

        let mut inner = self.inner.write().await;
        inner.history.push_back(record);
        while inner.history.len() > MAX_HISTORY {
            inner.history.pop_front();
        }
    }

    /// Statistics over records newer than `now - window_ms`, or over the
    /// whole retained history (since monitor start) when no window is given.
    pub async fn stats(&self, window_ms: Option<u64>) -> QueryStats {
        let inner = self.inner.read().await;
        let cutoff = match window_ms {
            Some(ms) => Utc::now() - ChronoDuration::milliseconds(ms as i64),
            None => inner.window_start,
        };

        let records: Vec<&QueryRecord> = inner
            .history
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .collect();
        compute_stats(&records, self.threshold_ms)
    }

    /// The slowest recorded queries, full history, descending by duration.
    ///
    /// The sort is stable, so equal durations keep insertion order.
    pub async fn slow_queries(&self, limit: usize) -> Vec<QueryRecord> {
        let inner = self.inner.read().await;
        let mut slow: Vec<QueryRecord> = inner
            .history
            .iter()
            .filter(|r| is_slow(r.duration_ms, self.threshold_ms))
            .cloned()
            .collect();
        slow.sort_by(|a, b| b.duration_ms.total_cmp(&a.duration_ms));
        slow.truncate(limit);
        slow
    }

    /// Binary operational trigger over the trailing five minutes.
    ///
    /// Fewer than ten samples never degrade; otherwise either a slow ratio
    /// above 10% or a p95 above twice the threshold trips it.
    pub async fn is_degraded(&self) -> bool {
        let stats = self.stats(Some(HEALTH_WINDOW_MS)).await;
        if stats.total_queries < MIN_DEGRADATION_SAMPLE {
            return false;
        }
        let slow_ratio = stats.slow_queries as f64 / stats.total_queries as f64;
        slow_ratio > 0.10 || stats.p95_duration_ms > 2.0 * self.threshold_ms as f64
    }

    /// Three-tier classification over the trailing five minutes.
    ///
    /// Critical and warning use independent threshold pairs: 20% slow or
    /// p99 over 5x the threshold for critical, 10% slow or p95 over 2x
    /// for warning.
    pub async fn health(&self) -> HealthReport {
        let stats = self.stats(Some(HEALTH_WINDOW_MS)).await;

        if stats.total_queries == 0 {
            return HealthReport {
                status: HealthStatus::Healthy,
                message: "no recent activity".to_string(),
                metrics: stats,
            };
        }

        let slow_ratio = stats.slow_queries as f64 / stats.total_queries as f64;
        let threshold = self.threshold_ms as f64;

        let (status, message) = if slow_ratio > 0.20 || stats.p99_duration_ms > 5.0 * threshold {
            (
                HealthStatus::Critical,
                format!(
                    "{:.0}% of queries slow, p99 at {:.0}ms",
                    slow_ratio * 100.0,
                    stats.p99_duration_ms
                ),
            )
        } else if slow_ratio > 0.10 || stats.p95_duration_ms > 2.0 * threshold {
            (
                HealthStatus::Warning,
                format!(
                    "{:.0}% of queries slow, p95 at {:.0}ms",
                    slow_ratio * 100.0,
                    stats.p95_duration_ms
                ),
            )
        } else {
            (
                HealthStatus::Healthy,
                format!(
                    "{} queries in window, {} slow",
                    stats.total_queries, stats.slow_queries
                ),
            )
        };

        HealthReport {
            status,
            message,
            metrics: stats,
        }
    }

    /// Clears history and restarts the window clock.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.history.clear();
        inner.window_start = Utc::now();
    }
}

fn compute_stats(records: &[&QueryRecord], threshold_ms: u64) -> QueryStats {
    if records.is_empty() {
        return QueryStats::default();
    }

    let mut durations: Vec<f64> = records.iter().map(|r| r.duration_ms).collect();
    durations.sort_by(f64::total_cmp);

    let total_queries = records.len() as u64;
    let slow_queries = records
        .iter()
        .filter(|r| is_slow(r.duration_ms, threshold_ms))
        .count() as u64;
    let avg_duration_ms = durations.iter().sum::<f64>() / durations.len() as f64;

    let mut stats = QueryStats {
        total_queries,
        slow_queries,
        avg_duration_ms,
        p50_duration_ms: percentile(&durations, 0.5),
        p95_duration_ms: percentile(&durations, 0.95),
        p99_duration_ms: percentile(&durations, 0.99),
        max_duration_ms: durations.last().copied().unwrap_or(0.0),
        ..QueryStats::default()
    };

    for record in records {
        let entry = stats
            .patterns
            .entry(normalize_query(&record.query))
            .or_default();
        entry.count += 1;
        entry.total_duration_ms += record.duration_ms;
        if is_slow(record.duration_ms, threshold_ms) {
            entry.slow_count += 1;
        }
    }
    for pattern in stats.patterns.values_mut() {
        pattern.avg_duration_ms = pattern.total_duration_ms / pattern.count as f64;
    }

    stats
}

/// Nearest-rank percentile: `index = ceil(n * fraction) - 1`, clamped at 0.
///
/// Selects an observed value without interpolating. Under-indexes slightly
/// for small n.
fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (sorted.len() as f64 * fraction).ceil() as usize;
    let index = rank.saturating_sub(1);
    sorted[index.min(sorted.len() - 1)]
}

fn slow_query_warning(record: &QueryRecord, threshold_ms: u64) -> String {
    format!(
        "┌─ slow query ─────────────────────────────\n\
         │ {}\n\
         │ threshold: {}ms\n\
         │ consider adding indexes or narrowing the selection\n\
         └──────────────────────────────────────────",
        format_query_log_line(record, threshold_ms),
        threshold_ms,
    )
}
