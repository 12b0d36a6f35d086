use super::{
    handlers::{health, metrics},
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Query performance metrics
        .route("/api/v1/metrics/queries", get(metrics::get_query_stats))
        .route(
            "/api/v1/metrics/queries/slow",
            get(metrics::get_slow_queries),
        )
        .route("/api/v1/metrics/pool", get(metrics::get_pool_status))
        .route("/api/v1/metrics/reset", post(metrics::reset_stats))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
