//! Project and access-token discovery.
//!
//! Each value is taken from configuration first, then from well-known
//! environment variables, and finally from the GCE metadata server that is
//! reachable from inside Cloud Run, Cloud Functions and Compute Engine.

use serde::Deserialize;
use tracing::debug;

use super::error::{ComputeError, ComputeResult};
use crate::config::ComputeConfig;
use crate::constants::{env as env_keys, gce};

/// Environment variable lookup; swapped out in tests
pub type EnvLookup = fn(&str) -> Option<String>;

/// Reads variables from the process environment
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Minimal metadata server client
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    endpoint: String,
}

impl MetadataClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str) -> ComputeResult<reqwest::Response> {
        let url = format!("{}/{}", self.endpoint, path);
        let response = self
            .http
            .get(&url)
            .header(gce::METADATA_FLAVOR_HEADER, gce::METADATA_FLAVOR_VALUE)
            .send()
            .await
            .map_err(|e| ComputeError::credentials(format!("metadata server unreachable at {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(ComputeError::credentials(format!(
                "metadata server returned {} for {path}",
                response.status().as_u16()
            )));
        }
        Ok(response)
    }

    pub async fn project_id(&self) -> ComputeResult<String> {
        let body = self
            .get(gce::METADATA_PROJECT_ID_PATH)
            .await?
            .text()
            .await
            .map_err(|e| ComputeError::credentials(format!("unreadable project id: {e}")))?;

        let project_id = body.trim();
        if project_id.is_empty() {
            return Err(ComputeError::credentials("metadata server returned an empty project id"));
        }
        Ok(project_id.to_string())
    }

    pub async fn access_token(&self) -> ComputeResult<String> {
        let token: MetadataToken = self
            .get(gce::METADATA_TOKEN_PATH)
            .await?
            .json()
            .await
            .map_err(|e| ComputeError::credentials(format!("unreadable token response: {e}")))?;
        Ok(token.access_token)
    }
}

/// Project id: config, then `GOOGLE_CLOUD_PROJECT`/`GCP_PROJECT`, then metadata
pub async fn resolve_project_id(
    config: &ComputeConfig,
    env: EnvLookup,
    metadata: &MetadataClient,
) -> ComputeResult<String> {
    if let Some(project_id) = &config.project_id {
        return Ok(project_id.clone());
    }

    if let Some(project_id) = env_keys::PROJECT_ID.iter().find_map(|key| env(key)) {
        debug!("Project id taken from environment");
        return Ok(project_id);
    }

    debug!("Project id not configured, asking metadata server");
    metadata.project_id().await
}

/// Access token: config, then `GOOGLE_OAUTH_ACCESS_TOKEN`, then metadata
pub async fn resolve_access_token(
    config: &ComputeConfig,
    env: EnvLookup,
    metadata: &MetadataClient,
) -> ComputeResult<String> {
    if let Some(token) = &config.access_token {
        return Ok(token.clone());
    }

    if let Some(token) = env(env_keys::ACCESS_TOKEN) {
        debug!("Access token taken from environment");
        return Ok(token);
    }

    metadata.access_token().await
}
