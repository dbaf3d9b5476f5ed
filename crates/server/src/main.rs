use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    serve, Router,
};
use counter_core::{
    config::AppConfig,
    counter::JokeCounter,
    metrics,
    reports::{schedule, DailyFileSink, MemorySink, ReportAggregator, ReportSink},
};
use server::{middleware, router};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG` takes precedence when set; otherwise the configured level is
/// applied to this workspace's crates and dependencies stay at `warn`.
fn init_logging(config: &AppConfig) {
    let level = config.logging.level.as_str();
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,counter_core={level},server={level}"))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json();
        registry.with(fmt_layer).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config =
        AppConfig::load().map_err(|e| anyhow::anyhow!("Configuration loading failed: {e}"))?;
    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config);
    info!("Starting joke counter");
    debug!(
        max_witnesses = config.counter.max_witnesses,
        reports_enabled = config.reports.enabled,
        bind_port = config.server.bind_port,
        "Configuration loaded"
    );

    if config.metrics_enabled() {
        let _ = metrics::init_prometheus_recorder();
    }

    let counter = Arc::new(JokeCounter::new(config.max_witnesses()));

    let sink: Arc<dyn ReportSink> = if config.reports_enabled() {
        Arc::new(DailyFileSink::new(config.reports_directory()))
    } else {
        info!("Report persistence disabled, keeping rollups in memory");
        Arc::new(MemorySink::new())
    };
    let aggregator = Arc::new(ReportAggregator::new(counter.clone(), sink));
    let scheduler_handle = schedule::start(aggregator);

    let app = create_app(counter, &config)?;
    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    info!(address = %addr, max_witnesses = config.max_witnesses(), "Joke counter listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = serve(listener, app.into_make_service_with_connect_info::<SocketAddr>());

    if let Err(e) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error occurred");
    }

    scheduler_handle.abort();
    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(
                error = %e,
                "Failed to install Ctrl+C handler"
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Failed to install signal handler"
                );

                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

fn create_app(counter: Arc<JokeCounter>, config: &AppConfig) -> Result<Router> {
    // Create request ID layers for tracing requests through the logs
    let (set_request_id, propagate_request_id) = middleware::create_request_id_layers();

    let mut app = Router::new()
        .route("/joke", post(router::handle_joke))
        .route("/reset", post(router::handle_reset))
        .route("/health", get(router::handle_health))
        .route("/metrics", get(router::handle_metrics))
        .with_state(counter);

    app = app.layer(ConcurrencyLimitLayer::new(config.server.max_concurrent_requests));

    if !config.server.allowed_origins.is_empty() {
        let origins = config
            .server
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {origin}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]);
        app = app.layer(cors);
    }

    // Add request ID middleware for log correlation
    // Layers are applied in reverse order, so propagate runs after set
    app = app.layer(propagate_request_id).layer(set_request_id);

    Ok(app)
}
