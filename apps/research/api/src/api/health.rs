//! Liveness and health reports.
//!
//! These handlers never check anything: every component is reported as
//! `healthy` and the status code is always 200. Host utilisation is the
//! job of the `health_check` background task.

use crate::state::AppState;
use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

pub const HEALTHY: &str = "healthy";

#[derive(Debug, Serialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub service: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
    /// RFC 3339, UTC, generated per request
    pub timestamp: String,
    pub environment: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentsHealth {
    pub api: &'static str,
    pub database: &'static str,
    pub redis: &'static str,
    pub file_system: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedHealthResponse {
    #[serde(flatten)]
    pub health: HealthResponse,
    pub components: ComponentsHealth,
    /// Seconds since the process started
    pub uptime: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(liveness))
        .route("/api/health/", get(health))
        .route("/api/health/detailed", get(detailed_health))
        .with_state(state)
}

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Welcome message", body = WelcomeResponse))
)]
pub async fn root(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {}", state.settings.app_name),
    })
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is alive", body = LivenessResponse))
)]
pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: HEALTHY,
        service: state.settings.app_name.clone(),
    })
}

/// Health report with version and environment
#[utoipa::path(
    get,
    path = "/api/health/",
    tag = "health",
    responses((status = 200, description = "Health report", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_report(&state))
}

/// Health report with component statuses and uptime
#[utoipa::path(
    get,
    path = "/api/health/detailed",
    tag = "health",
    responses((status = 200, description = "Detailed health report", body = DetailedHealthResponse))
)]
pub async fn detailed_health(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    Json(DetailedHealthResponse {
        health: health_report(&state),
        components: ComponentsHealth {
            api: HEALTHY,
            database: HEALTHY,
            redis: HEALTHY,
            file_system: HEALTHY,
        },
        uptime: state.started_at.elapsed().as_secs(),
    })
}

fn health_report(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: HEALTHY,
        service: state.settings.app_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        environment: state.settings.environment().as_str(),
    }
}
