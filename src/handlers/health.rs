use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::{errors::ServiceError, models::ModelKind, ApiResponse, AppState};

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
    Degraded,
}

/// Individual component health details
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthDetails {
    pub models: ComponentHealth,
    pub feature_schema: ComponentHealth,
}

/// Full health check response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub details: HealthDetails,
    pub response_time_ms: u64,
}

/// Tracks application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time (call this on application startup)
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

/// Service health
///
/// Down when no model artifact is loadable from disk, degraded when only
/// some are or the feature schema is missing.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "At least one model is available", body = HealthResponse),
        (status = 503, description = "No model artifacts available", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();
    let store = state.services.forecasting.store();

    let mut missing = Vec::new();
    for kind in ModelKind::iter() {
        if !store.artifact_exists(kind).await {
            missing.push(kind.artifact_file());
        }
    }
    let total = ModelKind::iter().count();
    let models = match missing.len() {
        0 => ComponentHealth {
            status: ComponentStatus::Up,
            message: format!("{} model artifacts present", total),
        },
        n if n == total => ComponentHealth {
            status: ComponentStatus::Down,
            message: format!("No model artifacts in {}", store.models_dir().display()),
        },
        _ => ComponentHealth {
            status: ComponentStatus::Degraded,
            message: format!("Missing: {}", missing.join(", ")),
        },
    };

    let feature_schema = match store.load_schema().await {
        Ok(schema) => ComponentHealth {
            status: ComponentStatus::Up,
            message: format!("{} expected feature columns", schema.len()),
        },
        Err(reason) => ComponentHealth {
            status: ComponentStatus::Degraded,
            message: reason.to_string(),
        },
    };

    let overall_status = match (models.status, feature_schema.status) {
        (ComponentStatus::Down, _) => ComponentStatus::Down,
        (ComponentStatus::Up, ComponentStatus::Up) => ComponentStatus::Up,
        _ => ComponentStatus::Degraded,
    };

    let status_code = match overall_status {
        ComponentStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        // Still serve traffic but alert
        ComponentStatus::Up | ComponentStatus::Degraded => StatusCode::OK,
    };

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs: get_uptime_secs(),
        details: HealthDetails {
            models,
            feature_schema,
        },
        response_time_ms: start.elapsed().as_millis() as u64,
    };

    (status_code, Json(response))
}

/// Service status
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Service metadata", body = ApiResponse<serde_json::Value>)
    ),
    tag = "Health"
)]
pub async fn api_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "forecast-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
        "models_dir": state.config.models_dir.display().to_string(),
        "cache_models": state.config.cache_models,
    });

    Ok(Json(ApiResponse::success(status_data)))
}
