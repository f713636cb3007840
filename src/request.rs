//! # Lifecycle Request Model
//!
//! The only data the handler works with: a command verb and the ordered list
//! of instances it applies to. Built from the event payload, consumed by the
//! dispatcher, then dropped.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DispatchError, UnknownCommandError};

/// Reported in place of a `command` field that is absent
const MISSING_COMMAND: &str = "<missing>";

/// Lifecycle verb understood by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleCommand {
    Start,
    Stop,
}

impl LifecycleCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleCommand::Start => "start",
            LifecycleCommand::Stop => "stop",
        }
    }

    /// Batch summary reported through the completion signal
    pub fn success_message(&self) -> &'static str {
        match self {
            LifecycleCommand::Start => crate::constants::messages::STARTED,
            LifecycleCommand::Stop => crate::constants::messages::STOPPED,
        }
    }
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleCommand {
    type Err = UnknownCommandError;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(LifecycleCommand::Start),
            "stop" => Ok(LifecycleCommand::Stop),
            other => Err(UnknownCommandError {
                command: other.to_string(),
            }),
        }
    }
}

/// A virtual machine identified by name within a zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceRef {
    pub name: String,
    pub zone: String,
}

impl InstanceRef {
    pub fn new(name: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
        }
    }
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone, self.name)
    }
}

/// Payload as it arrives on the wire.
///
/// Both fields stay loosely typed: a missing, non-string or unrecognized
/// `command` is ignored rather than rejected, and `instances` is only read
/// once the command is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLifecycleRequest {
    #[serde(default)]
    pub command: Option<Value>,
    #[serde(default)]
    pub instances: Option<Value>,
}

impl RawLifecycleRequest {
    /// Decode base64 event data into a raw request
    pub fn decode(data: &str) -> Result<Self, DispatchError> {
        let bytes = STANDARD.decode(data.trim()).map_err(|e| {
            DispatchError::malformed_payload(format!("event data is not valid base64: {e}"))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            DispatchError::malformed_payload(format!(
                "event data is not a valid lifecycle request: {e}"
            ))
        })
    }

    /// Validate the command against the known verbs
    pub fn command(&self) -> Result<LifecycleCommand, UnknownCommandError> {
        match &self.command {
            Some(Value::String(verb)) => verb.parse(),
            Some(other) => Err(UnknownCommandError {
                command: other.to_string(),
            }),
            None => Err(UnknownCommandError {
                command: MISSING_COMMAND.to_string(),
            }),
        }
    }

    /// Pair a validated command with the payload's instance list
    pub fn into_request(self, command: LifecycleCommand) -> Result<LifecycleRequest, DispatchError> {
        let instances = self.instances.ok_or_else(|| {
            DispatchError::malformed_payload(format!("`{command}` request has no instances"))
        })?;

        let instances: Vec<InstanceRef> = serde_json::from_value(instances).map_err(|e| {
            DispatchError::malformed_payload(format!("invalid instance list: {e}"))
        })?;

        Ok(LifecycleRequest { command, instances })
    }
}

/// Validated request: a known command plus its target instances
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleRequest {
    pub command: LifecycleCommand,
    pub instances: Vec<InstanceRef>,
}

impl LifecycleRequest {
    pub fn new(command: LifecycleCommand, instances: Vec<InstanceRef>) -> Self {
        Self { command, instances }
    }

    /// Encode as event data, the inverse of [`RawLifecycleRequest::decode`]
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let raw = RawLifecycleRequest {
            command: Some(Value::String(self.command.as_str().to_string())),
            instances: Some(serde_json::to_value(&self.instances)?),
        };
        Ok(STANDARD.encode(serde_json::to_vec(&raw)?))
    }
}
