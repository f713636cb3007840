use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use vm_lifecycle::{InstanceRef, ScheduledEvent};

/// Builder for scheduled events carrying a lifecycle payload
#[derive(Debug, Clone)]
pub struct EventBuilder {
    command: String,
    instances: Vec<InstanceRef>,
    message_id: Option<String>,
}

impl EventBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            instances: Vec::new(),
            message_id: None,
        }
    }

    pub fn start() -> Self {
        Self::new("start")
    }

    pub fn stop() -> Self {
        Self::new("stop")
    }

    pub fn instance(mut self, name: &str, zone: &str) -> Self {
        self.instances.push(InstanceRef::new(name, zone));
        self
    }

    pub fn instances(mut self, instances: &[InstanceRef]) -> Self {
        self.instances.extend_from_slice(instances);
        self
    }

    pub fn message_id(mut self, id: &str) -> Self {
        self.message_id = Some(id.to_string());
        self
    }

    /// Payload JSON before encoding
    pub fn payload(&self) -> Value {
        json!({
            "command": self.command,
            "instances": self.instances,
        })
    }

    /// Base64 event data
    pub fn data(&self) -> String {
        STANDARD.encode(self.payload().to_string())
    }

    pub fn build(self) -> ScheduledEvent {
        let mut event = ScheduledEvent::new(self.data());
        event.message_id = self.message_id;
        event
    }

    /// Pub/Sub push envelope body as delivered to the HTTP trigger
    pub fn push_envelope(&self) -> Value {
        json!({
            "message": {
                "data": self.data(),
                "attributes": {},
                "messageId": self.message_id.clone().unwrap_or_else(|| "1".to_string()),
            },
            "subscription": "projects/test-project/subscriptions/vm-lifecycle"
        })
    }
}

/// Event whose data is raw text encoded as base64 (valid base64, arbitrary body)
pub fn event_with_body(body: &str) -> ScheduledEvent {
    ScheduledEvent::new(STANDARD.encode(body))
}

/// `count` instances spread over two zones
pub fn instance_fleet(count: usize) -> Vec<InstanceRef> {
    (0..count)
        .map(|i| {
            let zone = if i % 2 == 0 {
                "us-central1-a"
            } else {
                "us-central1-b"
            };
            InstanceRef::new(format!("vm-{i}"), zone)
        })
        .collect()
}
