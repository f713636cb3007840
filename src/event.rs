//! # Inbound Events
//!
//! Shapes the scheduler trigger can deliver. Cloud Scheduler publishes to a
//! Pub/Sub topic; a push subscription wraps the message in an envelope, while
//! direct invocations carry the message itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Single scheduled message; `data` is the base64-encoded lifecycle request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    #[serde(default)]
    pub data: String,

    #[serde(default)]
    pub attributes: HashMap<String, String>,

    #[serde(default, rename = "messageId", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl ScheduledEvent {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}

/// Pub/Sub push subscription envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: ScheduledEvent,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

/// Either accepted body shape on the HTTP trigger.
///
/// Variant order matters: a bare event has only defaulted fields and would
/// match any object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InboundEvent {
    Push(PushEnvelope),
    Direct(ScheduledEvent),
}

impl InboundEvent {
    pub fn into_event(self) -> ScheduledEvent {
        match self {
            InboundEvent::Push(envelope) => envelope.message,
            InboundEvent::Direct(event) => event,
        }
    }
}
