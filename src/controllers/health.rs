use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// Providers wired into this process, reported by the readiness probe
#[derive(Debug, Clone)]
pub struct Readiness {
    pub storage: String,
    pub synthesis: String,
    pub pipeline_configured: bool,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(readiness): State<Arc<Readiness>>) -> impl IntoResponse {
    if readiness.pipeline_configured {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "storage": readiness.storage,
                "tts": readiness.synthesis
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "storage": readiness.storage,
                "tts": readiness.synthesis,
                "reason": "PROJECT_NUMBER and GCP_LOCATION must be set"
            })),
        )
    }
}
