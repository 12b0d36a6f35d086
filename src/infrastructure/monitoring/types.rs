//! Query observation and statistics types for the monitoring system.
//!
//! This module defines the record shape handed over by the database layer,
//! the aggregated statistics produced for dashboards and health checks,
//! and the health classification exposed to operational consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One observation of a completed query, created by the database layer
/// immediately after execution.
///
/// Records are timing-only: success and failure are not distinguished.
/// Numeric fields are stored as given, with no validation. Callers are
/// responsible for supplying sane values; a negative or non-finite
/// duration skews statistics rather than raising an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Wall-clock execution time in milliseconds
    pub duration_ms: f64,

    /// Raw query text (parameterized or plain SQL)
    pub query: String,

    /// When the query completed; drives time-window filtering
    pub timestamp: DateTime<Utc>,

    /// Logical entity name, when the caller knows it
    pub model: Option<String>,

    /// Logical operation name (e.g., "find_many"), when known
    pub operation: Option<String>,
}

impl QueryRecord {
    /// Record for a raw query with no entity/operation attribution.
    pub fn raw(query: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            duration_ms,
            query: query.into(),
            timestamp: Utc::now(),
            model: None,
            operation: None,
        }
    }

    /// Record attributed to a logical entity and operation.
    pub fn for_operation(
        model: impl Into<String>,
        operation: impl Into<String>,
        query: impl Into<String>,
        duration_ms: f64,
    ) -> Self {
        Self {
            duration_ms,
            query: query.into(),
            timestamp: Utc::now(),
            model: Some(model.into()),
            operation: Some(operation.into()),
        }
    }
}

/// Aggregates for one normalized query shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternStats {
    pub count: u64,
    pub total_duration_ms: f64,
    pub avg_duration_ms: f64,
    pub slow_count: u64,
}

/// Statistics computed over one time window of the query history.
///
/// An empty window produces all-zero counters and an empty pattern map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryStats {
    pub total_queries: u64,
    pub slow_queries: u64,
    pub avg_duration_ms: f64,
    pub p50_duration_ms: f64,
    pub p95_duration_ms: f64,
    pub p99_duration_ms: f64,
    pub max_duration_ms: f64,

    /// Per-pattern breakdown keyed by normalized query text
    pub patterns: HashMap<String, PatternStats>,
}

/// Three-tier health classification for the query workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Slow ratio and tail latency within budget
    Healthy,
    /// Slow ratio above 10% or p95 above twice the threshold
    Warning,
    /// Slow ratio above 20% or p99 above five times the threshold
    Critical,
}

/// Health classification plus the window statistics it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub message: String,
    pub metrics: QueryStats,
}
