//! # Dispatcher Configuration
//!
//! Layered configuration for the handler. Every field has a working default,
//! so a deployment needs no file at all; the execution environment supplies
//! project and credentials.
//!
//! ## Sources (lowest to highest precedence)
//!
//! - **Defaults**: [`DispatcherConfig::default`]
//! - **Optional YAML file**: path named by `VM_LIFECYCLE_CONFIG`
//! - **Environment**: `VM_LIFECYCLE__<SECTION>__<FIELD>`, e.g.
//!   `VM_LIFECYCLE__DISPATCH__MAX_CONCURRENCY=8`
//! - **`PORT`**: overrides `server.port`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vm_lifecycle::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let poll = manager.config().compute.operation_poll_interval();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::gce;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Deployment environment name (development/test/production)
    pub environment: String,

    /// Compute Engine API access
    pub compute: ComputeConfig,

    /// Batch fan-out behavior
    pub dispatch: DispatchConfig,

    /// HTTP trigger endpoint
    pub server: ServerConfig,
}

/// Compute Engine API and credential settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Project owning the instances; discovered from the environment when unset
    pub project_id: Option<String>,
    /// Static OAuth bearer token; fetched from the metadata server when unset
    pub access_token: Option<String>,
    pub api_endpoint: String,
    pub metadata_endpoint: String,
    pub operation_poll_interval_ms: u64,
    /// Bounds one HTTP exchange, never the lifecycle operation itself
    pub request_timeout_seconds: u64,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            access_token: None,
            api_endpoint: gce::DEFAULT_API_ENDPOINT.to_string(),
            metadata_endpoint: gce::DEFAULT_METADATA_ENDPOINT.to_string(),
            operation_poll_interval_ms: 1000,
            request_timeout_seconds: 60,
        }
    }
}

impl ComputeConfig {
    pub fn operation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.operation_poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Fan-out settings for a batch
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum in-flight lifecycle calls per batch; `None` launches every
    /// instance at once
    pub max_concurrency: Option<usize>,
}

/// HTTP trigger listener
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DispatcherConfig {
    /// Validate configuration values that would otherwise fail at call time
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.compute.api_endpoint.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "compute.api_endpoint",
                "compute configuration",
            ));
        }

        if self.compute.metadata_endpoint.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "compute.metadata_endpoint",
                "compute configuration",
            ));
        }

        if self.compute.operation_poll_interval_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "compute.operation_poll_interval_ms",
                "0",
                "poll interval must be greater than 0",
            ));
        }

        if self.compute.request_timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "compute.request_timeout_seconds",
                "0",
                "request timeout must be greater than 0",
            ));
        }

        if let Some(project_id) = &self.compute.project_id {
            if project_id.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    "compute.project_id",
                    project_id.clone(),
                    "project id cannot be blank when set",
                ));
            }
        }

        if self.dispatch.max_concurrency == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "dispatch.max_concurrency",
                "0",
                "concurrency limit must be greater than 0 (omit it for unbounded fan-out)",
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
