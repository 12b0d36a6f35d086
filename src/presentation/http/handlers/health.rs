use crate::infrastructure::monitoring::{HealthStatus, QueryStats};
use crate::presentation::http::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: HealthStatus,
    message: String,
    database: &'static str,
    version: &'static str,
    metrics: QueryStats,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // Check Database Connectivity
    let db_status = match state.db.ping().await {
        Ok(_) => "up",
        Err(e) => {
            tracing::error!("Health check failed: Database unreachable: {}", e);
            "down"
        }
    };

    let report = state.monitor.health().await;

    let code = if report.status == HealthStatus::Critical || db_status == "down" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let response = HealthResponse {
        status: report.status,
        message: report.message,
        database: db_status,
        version: env!("CARGO_PKG_VERSION"),
        metrics: report.metrics,
    };

    (code, Json(response))
}
