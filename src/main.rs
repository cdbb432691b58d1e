use axum::{routing::get, Router};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etherfi_bids_exporter::config::Config;
use etherfi_bids_exporter::handlers::metrics_endpoint;
use etherfi_bids_exporter::jobs::bids_sync::start_bids_sync_job;
use etherfi_bids_exporter::metrics::ExporterMetrics;
use etherfi_bids_exporter::services::subgraph::SubgraphService;
use etherfi_bids_exporter::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,etherfi_bids_exporter=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    tracing::info!("Starting EtherFi bids exporter");
    let config = Config::from_env();
    tracing::info!("Bidder address: {}", config.bidder_address);
    tracing::info!("API url: {}", config.api_url);
    tracing::info!(
        "Fetching bids interval minutes: {}",
        config.fetching_bids_interval_minutes
    );
    tracing::info!("Exporter port: {}", config.exporter_port);

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let metrics = ExporterMetrics::new().expect("Failed to build metrics registry");
    let subgraph = SubgraphService::new(config.api_url.clone(), metrics.api_health.clone());

    start_bids_sync_job(
        db.clone(),
        subgraph,
        metrics.clone(),
        config.bidder_address.clone(),
        config.fetching_bids_interval_minutes,
    )
    .await;

    let state = AppState { db, metrics };

    // Build router
    let app = Router::new()
        .route("/metrics", get(metrics_endpoint::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.exporter_port))
        .await
        .expect("Failed to bind exporter port");

    tracing::info!(
        "Metrics endpoint listening on {}",
        listener.local_addr().unwrap()
    );

    axum::serve(listener, app).await.unwrap();
}
