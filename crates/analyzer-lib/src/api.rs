//! HTTP API: health, service info, log analysis and metrics

use crate::{
    analysis::{LogAnalyzer, PlaceholderAnalyzer},
    error::{ApiError, ValidatedJson},
    health::{health_status, ReadinessState},
    models::{AnalysisRequest, AnalysisResponse, HealthStatus, MetricsSnapshot, ServiceInfo},
    observability::{AnalyzerMetrics, StructuredLogger},
};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::{sync::Arc, time::Instant};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Human-readable service name reported by `GET /`
pub const SERVICE_NAME: &str = "Multiverse Analyzer";

/// Version reported by `/health` and `/`
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn LogAnalyzer>,
    pub readiness: ReadinessState,
    pub metrics: AnalyzerMetrics,
    pub logger: StructuredLogger,
    /// Request body cap in bytes; `None` accepts bodies of any size
    pub max_body_bytes: Option<usize>,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn LogAnalyzer>, logger: StructuredLogger) -> Self {
        Self {
            analyzer,
            readiness: ReadinessState::new(),
            metrics: AnalyzerMetrics::new(),
            logger,
            max_body_bytes: None,
        }
    }

    /// Cap request bodies at `limit` bytes (`None` removes the cap)
    pub fn with_body_limit(mut self, limit: Option<usize>) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// State backed by the placeholder engine
    pub fn placeholder(logger: StructuredLogger) -> Self {
        Self::new(Arc::new(PlaceholderAnalyzer::new()), logger)
    }
}

async fn health() -> Json<HealthStatus> {
    Json(health_status(SERVICE_VERSION))
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        docs: "/docs".to_string(),
        health: "/health".to_string(),
    })
}

/// Readiness check - returns 200 if ready, 503 otherwise
async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.readiness.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    state
        .logger
        .log_analysis(request.logs.len(), &request.analysis_type, state.analyzer.name());
    state.metrics.record_request(request.logs.len());

    let started = Instant::now();
    let result = state.analyzer.analyze(&request).await;
    state
        .metrics
        .observe_analysis_latency(started.elapsed().as_secs_f64());

    match result {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            state.logger.log_analysis_failed(&err.to_string());
            state.metrics.inc_analysis_failures();
            Err(err.into())
        }
    }
}

/// Aggregate counters; always zero until real collection exists
async fn metrics() -> Json<MetricsSnapshot> {
    Json(MetricsSnapshot::default())
}

/// Prometheus metrics endpoint
async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            text,
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            err.to_string(),
        ),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = match state.max_body_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/analyze", post(analyze))
        .route("/metrics", get(metrics))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
