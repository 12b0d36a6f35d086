use crate::infrastructure::monitoring::{DEFAULT_SLOW_QUERY_LIMIT, QueryRecord, QueryStats};
use crate::presentation::http::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct StatsParams {
    /// Trailing window in milliseconds; omitted means since monitor start
    pub window_ms: Option<u64>,
}

pub async fn get_query_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Json<QueryStats> {
    Json(state.monitor.stats(params.window_ms).await)
}

#[derive(Deserialize)]
pub struct SlowQueryParams {
    pub limit: Option<usize>,
}

pub async fn get_slow_queries(
    State(state): State<AppState>,
    Query(params): Query<SlowQueryParams>,
) -> Json<Vec<QueryRecord>> {
    let limit = params.limit.unwrap_or(DEFAULT_SLOW_QUERY_LIMIT);
    Json(state.monitor.slow_queries(limit).await)
}

#[derive(Serialize)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
    pub max: u32,
}

pub async fn get_pool_status(State(state): State<AppState>) -> Json<PoolStatus> {
    let pool = state.db.pool();
    Json(PoolStatus {
        size: pool.size(),
        idle: pool.num_idle(),
        max: state.config.database.connection_limit,
    })
}

pub async fn reset_stats(State(state): State<AppState>) -> StatusCode {
    state.monitor.reset().await;
    tracing::info!("query performance history reset");
    StatusCode::NO_CONTENT
}
