//! Single-line formatting for query execution events.

use super::types::QueryRecord;

/// Longest query text carried into a log line before truncation.
const MAX_QUERY_LOG_LEN: usize = 200;

/// A query is slow when its duration strictly exceeds the threshold.
/// A duration exactly equal to the threshold is not slow.
pub fn is_slow(duration_ms: f64, threshold_ms: u64) -> bool {
    duration_ms > threshold_ms as f64
}

/// Render one human-readable line for a completed query.
///
/// `[SLOW QUERY]` or `[QUERY]`, the RFC 3339 completion timestamp, the
/// `model.operation` attribution (`RAW` when either half is missing), the
/// duration at two decimals, and the query text capped at 200 characters.
pub fn format_query_log_line(record: &QueryRecord, threshold_ms: u64) -> String {
    let label = if is_slow(record.duration_ms, threshold_ms) {
        "SLOW QUERY"
    } else {
        "QUERY"
    };

    let target = match (&record.model, &record.operation) {
        (Some(model), Some(operation)) => format!("{}.{}", model, operation),
        _ => "RAW".to_string(),
    };

    format!(
        "[{}] {} {} {:.2}ms {}",
        label,
        record.timestamp.to_rfc3339(),
        target,
        record.duration_ms,
        truncate_query(&record.query),
    )
}

fn truncate_query(query: &str) -> String {
    if query.chars().count() <= MAX_QUERY_LOG_LEN {
        query.to_string()
    } else {
        let mut text: String = query.chars().take(MAX_QUERY_LOG_LEN).collect();
        text.push_str("...");
        text
    }
}
