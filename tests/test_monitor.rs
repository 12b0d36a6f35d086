use chrono::{Duration, Utc};
use dbmon::infrastructure::monitoring::{HealthStatus, QueryMonitor, QueryRecord};

fn record(duration_ms: f64) -> QueryRecord {
    QueryRecord::raw("SELECT * FROM games WHERE id = $1", duration_ms)
}

fn aged_record(duration_ms: f64, age_minutes: i64) -> QueryRecord {
    QueryRecord {
        timestamp: Utc::now() - Duration::minutes(age_minutes),
        ..record(duration_ms)
    }
}

#[tokio::test]
async fn history_is_capped_at_one_thousand_newest() {
    let monitor = QueryMonitor::new(1000);
    for i in 0..1500 {
        monitor.record_query(record(i as f64)).await;
    }

    let stats = monitor.stats(None).await;
    assert_eq!(stats.total_queries, 1000);
    assert_eq!(stats.max_duration_ms, 1499.0);
    // Oldest 500 evicted, so the retained durations are 500..1500.
    assert_eq!(stats.avg_duration_ms, 999.5);
}

#[tokio::test]
async fn stats_are_idempotent_between_recordings() {
    let monitor = QueryMonitor::new(1000);
    for duration in [100.0, 250.0, 1250.0] {
        monitor.record_query(record(duration)).await;
    }

    let first = serde_json::to_value(monitor.stats(Some(60_000)).await).unwrap();
    let second = serde_json::to_value(monitor.stats(Some(60_000)).await).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn window_excludes_older_records() {
    let monitor = QueryMonitor::new(1000);
    monitor.record_query(aged_record(100.0, 10)).await;
    monitor.record_query(aged_record(200.0, 10)).await;
    monitor.record_query(record(300.0)).await;

    let windowed = monitor.stats(Some(300_000)).await;
    assert_eq!(windowed.total_queries, 1);
    assert_eq!(windowed.max_duration_ms, 300.0);

    let hour = monitor.stats(Some(3_600_000)).await;
    assert_eq!(hour.total_queries, 3);
}

#[tokio::test]
async fn empty_window_yields_zeroed_stats() {
    let monitor = QueryMonitor::new(1000);
    let stats = monitor.stats(Some(300_000)).await;

    assert_eq!(stats.total_queries, 0);
    assert_eq!(stats.slow_queries, 0);
    assert_eq!(stats.avg_duration_ms, 0.0);
    assert_eq!(stats.p99_duration_ms, 0.0);
    assert!(stats.patterns.is_empty());
}

#[tokio::test]
async fn slow_listing_sorts_descending_and_limits() {
    let monitor = QueryMonitor::new(1000);
    monitor.record_query(record(1200.0)).await;
    monitor.record_query(record(400.0)).await;
    monitor.record_query(record(2500.0)).await;
    monitor.record_query(record(1800.0)).await;

    let slow = monitor.slow_queries(10).await;
    let durations: Vec<f64> = slow.iter().map(|r| r.duration_ms).collect();
    assert_eq!(durations, vec![2500.0, 1800.0, 1200.0]);

    let top_two = monitor.slow_queries(2).await;
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[0].duration_ms, 2500.0);
}

#[tokio::test]
async fn slow_listing_keeps_insertion_order_on_ties() {
    let monitor = QueryMonitor::new(1000);
    monitor
        .record_query(QueryRecord::raw("SELECT * FROM first", 1500.0))
        .await;
    monitor
        .record_query(QueryRecord::raw("SELECT * FROM second", 1500.0))
        .await;

    let slow = monitor.slow_queries(10).await;
    assert!(slow[0].query.contains("first"));
    assert!(slow[1].query.contains("second"));
}

#[tokio::test]
async fn degradation_requires_ten_samples() {
    let monitor = QueryMonitor::new(1000);
    for _ in 0..9 {
        monitor.record_query(record(5000.0)).await;
    }
    assert!(!monitor.is_degraded().await);

    monitor.record_query(record(5000.0)).await;
    assert!(monitor.is_degraded().await);
}

#[tokio::test]
async fn high_slow_ratio_trips_degradation() {
    let monitor = QueryMonitor::new(1000);
    for _ in 0..8 {
        monitor.record_query(record(1500.0)).await;
    }
    for _ in 0..2 {
        monitor.record_query(record(100.0)).await;
    }

    assert!(monitor.is_degraded().await);
}

#[tokio::test]
async fn fast_workload_is_healthy() {
    let monitor = QueryMonitor::new(1000);
    for _ in 0..10 {
        monitor.record_query(record(100.0)).await;
    }

    assert!(!monitor.is_degraded().await);
    let report = monitor.health().await;
    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.metrics.total_queries, 10);
}

#[tokio::test]
async fn idle_monitor_reports_healthy_no_activity() {
    let monitor = QueryMonitor::new(1000);
    let report = monitor.health().await;

    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.message, "no recent activity");
}

#[tokio::test]
async fn slow_ratio_past_twenty_percent_is_critical() {
    let monitor = QueryMonitor::new(1000);
    for _ in 0..3 {
        monitor.record_query(record(1500.0)).await;
    }
    for _ in 0..7 {
        monitor.record_query(record(100.0)).await;
    }

    let report = monitor.health().await;
    assert_eq!(report.status, HealthStatus::Critical);
}

#[tokio::test]
async fn tail_latency_blowout_is_critical_despite_low_ratio() {
    let monitor = QueryMonitor::new(1000);
    for _ in 0..9 {
        monitor.record_query(record(100.0)).await;
    }
    // One extreme outlier: 10% slow ratio does not trip the ratio check,
    // but p99 lands on the outlier and exceeds five times the threshold.
    monitor.record_query(record(6000.0)).await;

    let report = monitor.health().await;
    assert_eq!(report.status, HealthStatus::Critical);
}

#[tokio::test]
async fn moderate_slow_ratio_is_warning() {
    let monitor = QueryMonitor::new(1000);
    for _ in 0..2 {
        monitor.record_query(record(1200.0)).await;
    }
    for _ in 0..8 {
        monitor.record_query(record(100.0)).await;
    }

    let report = monitor.health().await;
    assert_eq!(report.status, HealthStatus::Warning);
}

#[tokio::test]
async fn reset_clears_history_and_slow_listing() {
    let monitor = QueryMonitor::new(1000);
    for _ in 0..5 {
        monitor.record_query(record(2000.0)).await;
    }
    assert_eq!(monitor.stats(None).await.total_queries, 5);

    monitor.reset().await;

    assert_eq!(monitor.stats(None).await.total_queries, 0);
    assert!(monitor.slow_queries(10).await.is_empty());
}
