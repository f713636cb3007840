//! # Compute Engine Provider
//!
//! REST implementation of the compute seam:
//!
//! - `POST {api}/projects/{project}/zones/{zone}/instances/{name}/start`
//! - `POST {api}/projects/{project}/zones/{zone}/instances/{name}/stop`
//! - `POST {api}/projects/{project}/zones/{zone}/operations/{operation}/wait`
//!
//! `operations.wait` returns when the operation is `DONE` or after a server
//! side deadline, so [`GceOperation::wait`] keeps calling it until `DONE`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::credentials::{self, EnvLookup, MetadataClient};
use super::error::{ComputeError, ComputeResult};
use super::{LifecycleOperation, VmHandle, VmHandleResolver};
use crate::config::ComputeConfig;
use crate::constants::gce;
use crate::request::{InstanceRef, LifecycleCommand};

/// Compute Engine `Operation` resource, trimmed to the fields we read
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResource {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub target_link: Option<String>,
    #[serde(default)]
    pub error: Option<OperationErrorBlock>,
    #[serde(default)]
    pub http_error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationErrorBlock {
    #[serde(default)]
    pub errors: Vec<OperationErrorItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationErrorItem {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl OperationResource {
    pub fn is_done(&self) -> bool {
        self.status == gce::OPERATION_DONE
    }

    /// Error summary for a `DONE` operation, `None` when it succeeded
    pub fn failure(&self) -> Option<String> {
        let block = self.error.as_ref()?;
        let mut parts: Vec<String> = block
            .errors
            .iter()
            .map(|item| match (&item.code, &item.message) {
                (Some(code), Some(message)) => format!("{code}: {message}"),
                (Some(code), None) => code.clone(),
                (None, Some(message)) => message.clone(),
                (None, None) => "unknown error".to_string(),
            })
            .collect();

        if parts.is_empty() {
            parts.push(
                self.http_error_message
                    .clone()
                    .unwrap_or_else(|| "operation reported an error".to_string()),
            );
        }
        Some(parts.join("; "))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Check a payload-supplied URL path segment against Compute Engine naming:
/// `[a-z]([-a-z0-9]{0,61}[a-z0-9])?`
pub fn validate_resource_name(field: &str, value: &str) -> ComputeResult<()> {
    let reject = |reason: &str| Err(ComputeError::invalid_target(field, value, reason));

    let Some(first) = value.chars().next() else {
        return reject("must not be empty");
    };
    if value.len() > gce::MAX_RESOURCE_NAME_LEN {
        return reject("must be at most 63 characters");
    }
    if !first.is_ascii_lowercase() {
        return reject("must start with a lowercase letter");
    }
    if value.ends_with('-') {
        return reject("must not end with '-'");
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return reject("may only contain lowercase letters, digits and '-'");
    }
    Ok(())
}

/// Authenticated client bound to one project
#[derive(Debug, Clone)]
pub struct GceClient {
    http: reqwest::Client,
    api_endpoint: String,
    project_id: String,
    access_token: String,
    poll_interval: Duration,
}

impl GceClient {
    /// Build a client, discovering project and token through `env` and the
    /// metadata server
    pub async fn connect_with_env(config: &ComputeConfig, env: EnvLookup) -> ComputeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ComputeError::http("build client", e))?;

        let metadata = MetadataClient::new(http.clone(), config.metadata_endpoint.clone());
        let project_id = credentials::resolve_project_id(config, env, &metadata).await?;
        let access_token = credentials::resolve_access_token(config, env, &metadata).await?;

        Ok(Self {
            http,
            api_endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            project_id,
            access_token,
            poll_interval: config.operation_poll_interval(),
        })
    }

    /// Handle for one instance, sharing this client's connection pool
    pub fn instance(&self, instance: &InstanceRef) -> GceInstance {
        GceInstance {
            client: self.clone(),
            instance: instance.clone(),
        }
    }

    fn zone_url(&self, zone: &str) -> String {
        format!(
            "{}/projects/{}/zones/{}",
            self.api_endpoint, self.project_id, zone
        )
    }

    async fn post<T: DeserializeOwned>(&self, operation: &str, url: String) -> ComputeResult<T> {
        debug!(operation = %operation, url = %url, "Compute API request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| ComputeError::http(operation, e))?;

        Self::parse_response(operation, response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        operation: &str,
        response: reqwest::Response,
    ) -> ComputeResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(ComputeError::api(operation, status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ComputeError::invalid_response(operation, e))
    }

    /// `instances.start` / `instances.stop`
    pub async fn instance_action(
        &self,
        instance: &InstanceRef,
        command: LifecycleCommand,
    ) -> ComputeResult<OperationResource> {
        validate_resource_name("zone", &instance.zone)?;
        validate_resource_name("instance name", &instance.name)?;

        let url = format!(
            "{}/instances/{}/{}",
            self.zone_url(&instance.zone),
            instance.name,
            command.as_str()
        );
        self.post(&format!("instances.{command}"), url).await
    }

    /// One `zoneOperations.wait` round trip
    pub async fn wait_operation(&self, zone: &str, name: &str) -> ComputeResult<OperationResource> {
        let url = format!("{}/operations/{}/wait", self.zone_url(zone), name);
        self.post("zoneOperations.wait", url).await
    }
}

/// [`VmHandle`] for one Compute Engine instance
#[derive(Debug, Clone)]
pub struct GceInstance {
    client: GceClient,
    instance: InstanceRef,
}

impl GceInstance {
    async fn issue(&self, command: LifecycleCommand) -> ComputeResult<Box<dyn LifecycleOperation>> {
        let resource = self.client.instance_action(&self.instance, command).await?;
        debug!(
            instance = %self.instance,
            operation = %resource.name,
            status = %resource.status,
            "Lifecycle call accepted"
        );

        Ok(Box::new(GceOperation {
            client: self.client.clone(),
            zone: self.instance.zone.clone(),
            initial: resource,
        }))
    }
}

#[async_trait]
impl VmHandle for GceInstance {
    fn instance(&self) -> &InstanceRef {
        &self.instance
    }

    async fn start(&self) -> ComputeResult<Box<dyn LifecycleOperation>> {
        self.issue(LifecycleCommand::Start).await
    }

    async fn stop(&self) -> ComputeResult<Box<dyn LifecycleOperation>> {
        self.issue(LifecycleCommand::Stop).await
    }
}

/// Zonal long-running operation
#[derive(Debug)]
pub struct GceOperation {
    client: GceClient,
    zone: String,
    initial: OperationResource,
}

#[async_trait]
impl LifecycleOperation for GceOperation {
    fn name(&self) -> &str {
        &self.initial.name
    }

    async fn wait(&self) -> ComputeResult<()> {
        let mut current = self.initial.clone();
        let mut polls = 0u32;

        while !current.is_done() {
            if polls > 0 {
                tokio::time::sleep(self.client.poll_interval).await;
            }
            polls += 1;
            current = self.client.wait_operation(&self.zone, &self.initial.name).await?;
            debug!(
                operation = %current.name,
                status = %current.status,
                polls = polls,
                "Operation polled"
            );
        }

        match current.failure() {
            Some(message) => {
                warn!(operation = %current.name, error = %message, "Operation resolved with error");
                Err(ComputeError::operation_failed(current.name.clone(), message))
            }
            None => Ok(()),
        }
    }
}

/// Resolver that builds a fresh [`GceClient`] for every handle
#[derive(Debug, Clone)]
pub struct GceResolver {
    config: ComputeConfig,
    env: EnvLookup,
}

impl GceResolver {
    pub fn new(config: ComputeConfig) -> Self {
        Self {
            config,
            env: credentials::process_env,
        }
    }

    pub fn with_env(config: ComputeConfig, env: EnvLookup) -> Self {
        Self { config, env }
    }
}

#[async_trait]
impl VmHandleResolver for GceResolver {
    async fn resolve(&self, instance: &InstanceRef) -> ComputeResult<Box<dyn VmHandle>> {
        let client = GceClient::connect_with_env(&self.config, self.env).await?;
        Ok(Box::new(client.instance(instance)))
    }
}
