//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::web::state::AppState;

/// Basic health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub timestamp: String,
}

/// Basic health check endpoint: GET /health
///
/// Returns OK while the process is serving; there are no downstream checks
/// because the provider is only contacted per event.
pub async fn basic_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        environment: state.environment.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
