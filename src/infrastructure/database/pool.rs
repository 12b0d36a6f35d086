use crate::config::{Config, DatabaseSettings};
use crate::infrastructure::database::url::build_connection_url;
use crate::infrastructure::monitoring::{QueryMonitor, QueryRecord, format_query_log_line};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let url = build_connection_url(&config.database_url, &config.database)?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database.connection_limit)
        .acquire_timeout(Duration::from_secs(config.database.pool_timeout_seconds))
        .connect(&url)
        .await?;
    Ok(pool)
}

/// Pool handle that times every execution and feeds the query monitor.
///
/// Cheap to clone; all handles share the underlying pool and monitor.
#[derive(Clone)]
pub struct MonitoredDb {
    pool: PgPool,
    monitor: Arc<QueryMonitor>,
    log_queries: bool,
}

impl MonitoredDb {
    pub fn new(pool: PgPool, monitor: Arc<QueryMonitor>, settings: &DatabaseSettings) -> Self {
        Self {
            pool,
            monitor,
            log_queries: settings.logs_queries(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a query future, time it, and record the observation.
    ///
    /// The observation is recorded whether the query succeeded or failed;
    /// the monitor tracks timing only. When query logging is enabled, one
    /// formatted line per execution goes to the debug channel.
    pub async fn observe<T, E>(
        &self,
        model: Option<&str>,
        operation: Option<&str>,
        sql: &str,
        query: impl Future<Output = Result<T, E>>,
    ) -> Result<T, E> {
        let started = Instant::now();
        let outcome = query.await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let record = match (model, operation) {
            (Some(model), Some(operation)) => {
                QueryRecord::for_operation(model, operation, sql, duration_ms)
            }
            _ => QueryRecord::raw(sql, duration_ms),
        };

        if self.log_queries {
            tracing::debug!(
                "{}",
                format_query_log_line(&record, self.monitor.threshold_ms())
            );
        }
        self.monitor.record_query(record).await;

        outcome
    }

    /// Round-trip liveness probe through the instrumented path.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        let sql = "SELECT 1";
        self.observe(None, None, sql, sqlx::query(sql).execute(&self.pool))
            .await
            .map(|_| ())
    }
}
