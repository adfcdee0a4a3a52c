use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, predict::AppState},
    metrics,
    predictor::Predictor,
    rates::{self, RateProvider, RateTable},
    signals::setup_signal_handlers,
};

/// Start the price predictor server
///
/// This function:
/// 1. Initializes metrics
/// 2. Loads the model artifact (fatal if missing or corrupt)
/// 3. Prepares the rate table and spawns the refresh loop
/// 4. Sets up signal handlers for graceful shutdown and rate refresh
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics());

    // The model is the one piece of persisted state; refuse to start
    // without it rather than failing on the first request
    let predictor = Arc::new(
        Predictor::load(&config.model.path)
            .map_err(|e| anyhow::anyhow!("failed to load model artifact: {}", e))?,
    );
    info!(
        model = %predictor.name(),
        version = %predictor.version(),
        features = predictor.feature_width(),
        "Model artifact loaded"
    );

    // Start on the static table; a live fetch replaces it when it succeeds
    let rate_table = Arc::new(ArcSwap::from_pointee(RateTable::fallback()));
    let provider = Arc::new(RateProvider::new(config.rates.url.clone()));
    if config.rates.refresh {
        provider.refresh_into(&rate_table).await;
        tokio::spawn(rates::refresh_loop(
            provider.clone(),
            rate_table.clone(),
            Duration::from_secs(config.rates.ttl_seconds),
        ));
    } else {
        info!("Rate refresh disabled, serving static fallback rates");
    }

    // Setup signal handlers (SIGTERM, SIGINT for shutdown; SIGHUP refreshes rates)
    let (shutdown_tx, signal_handle) = setup_signal_handlers(provider, rate_table.clone());
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app_state = AppState {
        config: Arc::new(config.clone()),
        predictor,
        rates: rate_table,
    };

    let app = create_router(app_state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting carpricer on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
fn create_router(
    app_state: AppState,
    metrics_handle: Arc<metrics_exporter_prometheus::PrometheusHandle>,
) -> Router {
    let app_routes = Router::new()
        .route("/", get(handlers::page::index))
        .route("/api/v1/predict", post(handlers::predict::handle_predict))
        .route("/api/v1/rates", get(handlers::rates::list_rates))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(app_state);

    Router::new()
        // Public endpoints without application state
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(app_routes)
        // A car spec is tiny; anything bigger than this is not one
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
