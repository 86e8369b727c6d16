use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use credit_risk_api::artifacts::ArtifactSet;
use credit_risk_api::config::Config;
use credit_risk_api::handlers::{self, AppState};

/// Main entry point for the application.
///
/// Initializes logging and configuration, loads the model artifacts (the
/// process comes up degraded rather than crashing when an artifact is
/// missing or corrupt), and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_risk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Credit Risk Assessment API...");

    // Load configuration
    let config = Config::from_env()?;

    // Load model artifacts once; they are immutable for the process lifetime
    let artifacts = ArtifactSet::load(&config.model_dir);
    if artifacts.is_complete() {
        tracing::info!("All model artifacts loaded successfully");
    } else {
        tracing::warn!(
            detail = artifacts.detail().as_deref().unwrap_or("unknown"),
            "Starting in degraded mode; /predict will return 503 until restarted with valid artifacts"
        );
    }

    let addr = format!("{}:{}", config.host, config.port);
    let app_state = Arc::new(AppState::from_artifacts(config, artifacts));

    // Rate limiting: 10 req/sec per IP, burst of 20; /health is merged
    // outside the governed routes so health probes cannot be throttled
    let app: Router = handlers::app(app_state, 10, 20)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
