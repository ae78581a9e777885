use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub catalog_size: usize,
    pub catalog_source: String,
    pub ai_configured: bool,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Selalu 200; "degraded" kalau katalog dari fallback
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let origin = state.catalog.origin();
    let status = if origin.is_fallback() { "degraded" } else { "ready" };

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: status.to_string(),
            catalog_size: state.catalog.len(),
            catalog_source: origin.to_string(),
            ai_configured: state.assistant.ai_configured(),
        }),
    )
}
