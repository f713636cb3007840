//! # Scheduled Event Handler
//!
//! `POST /` accepts a Pub/Sub push envelope or a bare scheduled event and
//! runs it through the dispatcher. The dispatcher's completion signal becomes
//! the HTTP response.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

use crate::dispatcher::DispatchOutcome;
use crate::event::InboundEvent;
use crate::request::LifecycleCommand;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Body returned for a successful invocation
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventResponse {
    Completed {
        command: LifecycleCommand,
        instance_count: usize,
        message: String,
    },
    Ignored {
        command: String,
    },
}

impl From<DispatchOutcome> for EventResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Completed {
                command,
                instance_count,
                message,
            } => EventResponse::Completed {
                command,
                instance_count,
                message,
            },
            DispatchOutcome::Ignored { command } => EventResponse::Ignored { command },
        }
    }
}

/// Scheduled event endpoint: POST /
pub async fn handle_scheduled_event(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<EventResponse>> {
    let inbound: InboundEvent = serde_json::from_slice(&body)?;
    let event = inbound.into_event();
    debug!(message_id = ?event.message_id, "Scheduled event received");

    let (completion_tx, completion_rx) = oneshot::channel();
    state
        .dispatcher
        .run_handler(&event, move |result| {
            let _ = completion_tx.send(result);
        })
        .await;

    let outcome = completion_rx
        .await
        .map_err(|_| ApiError::internal("dispatcher finished without signalling completion"))??;

    Ok(Json(outcome.into()))
}
