//! Monitoring and observability infrastructure.
//!
//! This module provides query performance observability for the service:
//! - Rolling query history with bounded memory and FIFO eviction
//! - Windowed statistics (percentiles, pattern breakdown, slow counts)
//! - Slow-query warnings with a pluggable output sink
//! - Degradation detection and three-tier health classification
//!
//! The monitor is designed to be lightweight and safe to call from request
//! hot paths; the only side effect anywhere in it is the slow-query warning
//! emission, which is fire-and-forget.

pub mod log_format;
pub mod monitor;
pub mod pattern;
pub mod traits;
pub mod types;

pub use log_format::{format_query_log_line, is_slow};
pub use monitor::{DEFAULT_SLOW_QUERY_LIMIT, MAX_HISTORY, QueryMonitor};
pub use pattern::normalize_query;
pub use traits::{SlowQuerySink, TracingSink};
pub use types::{HealthReport, HealthStatus, PatternStats, QueryRecord, QueryStats};
