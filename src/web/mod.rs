//! # Web Trigger Module
//!
//! Axum HTTP surface for scheduler push delivery (Cloud Run style).
//!
//! - [`handlers::events`] - `POST /` scheduled event intake
//! - [`handlers::health`] - `GET /health`
//! - [`errors`] - HTTP error mapping
//! - [`state`] - Shared application state

pub mod errors;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;

/// Create the Axum application with all routes
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::events::handle_scheduled_event))
        .route("/health", get(handlers::health::basic_health))
        .with_state(app_state)
}
