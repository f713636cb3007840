//! # System Constants
//!
//! Fixed strings and endpoints shared by the dispatcher, the Compute Engine
//! provider and the HTTP trigger.

/// Completion messages reported for a successful batch
pub mod messages {
    pub const STARTED: &str = "Successfully started instance(s)";
    pub const STOPPED: &str = "Successfully stopped instance(s)";
}

/// Compute Engine and metadata server endpoints
pub mod gce {
    pub const DEFAULT_API_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";
    pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal/computeMetadata/v1";

    pub const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
    pub const METADATA_FLAVOR_VALUE: &str = "Google";
    pub const METADATA_PROJECT_ID_PATH: &str = "project/project-id";
    pub const METADATA_TOKEN_PATH: &str = "instance/service-accounts/default/token";

    /// Longest instance or zone name Compute Engine accepts
    pub const MAX_RESOURCE_NAME_LEN: usize = 63;

    /// `Operation.status` value once the operation has resolved
    pub const OPERATION_DONE: &str = "DONE";
}

/// Environment variables read outside the layered configuration
pub mod env {
    pub const ENVIRONMENT: &str = "VM_LIFECYCLE_ENV";
    pub const APP_ENV: &str = "APP_ENV";
    pub const CONFIG_FILE: &str = "VM_LIFECYCLE_CONFIG";
    pub const CONFIG_PREFIX: &str = "VM_LIFECYCLE";
    pub const PORT: &str = "PORT";
    pub const PROJECT_ID: &[&str] = &["GOOGLE_CLOUD_PROJECT", "GCP_PROJECT"];
    pub const ACCESS_TOKEN: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
}
