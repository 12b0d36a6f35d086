use dbmon::{
    config::Config,
    infrastructure::{
        database::{MonitoredDb, create_pool},
        monitoring::QueryMonitor,
    },
    presentation::http::{routes::create_router, state::AppState},
    workers::stats_reporter::StatsReporter,
};
use http::{HeaderValue, header};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Initialize logging with safe environment filter
    // Uses RUST_LOG if set, otherwise derives defaults from resolved log levels
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.database.default_log_filter()))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        connection_limit = config.database.connection_limit,
        pool_timeout_seconds = config.database.pool_timeout_seconds,
        slow_query_threshold_ms = config.database.slow_query_threshold_ms,
        "resolved database settings"
    );

    let pool = create_pool(&config).await?;
    let monitor = Arc::new(QueryMonitor::new(config.database.slow_query_threshold_ms));
    let db = MonitoredDb::new(pool, monitor.clone(), &config.database);

    if config.enable_stats_reporter {
        let reporter = StatsReporter::new(monitor.clone(), config.stats_report_interval_seconds);
        tokio::spawn(async move { reporter.start().await });
    }

    let state = AppState {
        db,
        monitor,
        config: config.clone(),
    };

    let app = create_router(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("DBMON ONLINE AT {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, initiating graceful shutdown");
        }
    }
}
