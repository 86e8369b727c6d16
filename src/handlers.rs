use crate::artifacts::ArtifactSet;
use crate::config::Config;
use crate::errors::AppError;
use crate::features;
use crate::models::{HealthResponse, PredictionResponse};
use crate::scoring::RiskScorer;
use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::limit::RequestBodyLimitLayer;

/// Shared application state injected into handlers.
///
/// The scorer wraps the artifacts loaded at startup; it is `None` when
/// either artifact failed to load, in which case predictions are refused
/// with 503 until the process is restarted with corrected artifacts.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Risk scorer over the loaded artifacts, absent in degraded mode.
    pub scorer: Option<Arc<RiskScorer>>,
    /// Whether the preprocessing artifact deserialized at startup.
    pub preprocessor_loaded: bool,
    /// Whether the classifier artifact deserialized at startup.
    pub model_loaded: bool,
    /// Per-artifact load failure detail for the health endpoint.
    pub load_detail: Option<String>,
}

impl AppState {
    /// Build the state from the startup artifact load outcome.
    pub fn from_artifacts(config: Config, artifacts: ArtifactSet) -> Self {
        let thresholds = config.risk_thresholds();
        let scorer = match (&artifacts.preprocessor, &artifacts.model) {
            (Some(preprocessor), Some(model)) => Some(Arc::new(RiskScorer::new(
                preprocessor.clone(),
                model.clone(),
                thresholds,
            ))),
            _ => None,
        };

        Self {
            config,
            scorer,
            preprocessor_loaded: artifacts.preprocessor.is_some(),
            model_loaded: artifacts.model.is_some(),
            load_detail: artifacts.detail(),
        }
    }
}

/// Build the bare application router without middleware, for tests that
/// exercise endpoint behavior directly.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
}

/// Build the served composition: API routes behind a request body limit and
/// per-IP rate limiting, with `/health` merged outside the governed routes
/// so orchestrator probes are never throttled.
pub fn app(state: Arc<AppState>, requests_per_second: u64, burst_size: u32) -> Router {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(requests_per_second)
            .burst_size(burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    let protected_routes = Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload, applications are tiny
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    Router::new()
        .route("/health", get(health))
        .merge(protected_routes)
        .with_state(state)
}

/// GET /health
///
/// Reports per-artifact load status. Always 200 so orchestrators can read
/// the body; "unhealthy" plus `detail` identifies which artifact failed.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.model_loaded && state.preprocessor_loaded;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            model_loaded: state.model_loaded,
            preprocessor_loaded: state.preprocessor_loaded,
            detail: state.load_detail.clone(),
        }),
    )
}

/// POST /predict
///
/// Validates the loan application, runs it through the preprocessing
/// transform and classifier, and returns the probability, classification,
/// risk level and recommendation message.
///
/// # Returns
///
/// * 200 with `PredictionResponse` on success.
/// * 400 naming every failing field on validation errors.
/// * 500 when an inference stage fails.
/// * 503 while artifacts are unloaded.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let scorer = state.scorer.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable(
            "Models not loaded. Please ensure model files are available.".to_string(),
        )
    })?;

    // Map axum's rejection so malformed bodies get the same {"error": ...}
    // shape as field-level validation failures.
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let application = features::parse_application(&payload)?;
    let assessment = scorer.assess(&application)?;

    tracing::info!(
        prediction = assessment.prediction,
        probability = assessment.probability,
        risk_level = assessment.risk_level.as_str(),
        "Prediction completed"
    );

    Ok(Json(assessment.into()))
}

/// GET /
///
/// Root endpoint with API information.
pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Credit Risk Assessment API",
        "endpoints": {
            "GET /": "API information",
            "GET /health": "Health check",
            "POST /predict": "Make credit risk prediction"
        },
        "usage": "Send POST request to /predict with loan applicant features"
    }))
}
