use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

const AVAILABLE: &str = "available";

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub services: ServicesStatus,
}

/// Research capabilities served by the external pipeline.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServicesStatus {
    pub imputation: &'static str,
    pub correlation: &'static str,
    pub eda: &'static str,
    pub feature_selection: &'static str,
}

pub fn router() -> Router {
    Router::new().route("/status", get(status))
}

/// API status
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "status",
    responses((status = 200, description = "API is operational", body = StatusResponse))
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
        services: ServicesStatus {
            imputation: AVAILABLE,
            correlation: AVAILABLE,
            eda: AVAILABLE,
            feature_selection: AVAILABLE,
        },
    })
}
