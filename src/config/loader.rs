//! Configuration Loader
//!
//! Environment-aware configuration loading. Layers defaults, an optional YAML
//! file and prefixed environment variables through the `config` crate.

use super::error::{ConfigResult, ConfigurationError};
use super::DispatcherConfig;
use crate::constants::env as env_keys;
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: DispatcherConfig,
    config_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from the process environment
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::load_from_vars(&vars)
    }

    /// Load configuration from an explicit variable map.
    ///
    /// Useful for testing without modifying global environment variables.
    pub fn load_from_vars(vars: &HashMap<String, String>) -> ConfigResult<Arc<ConfigManager>> {
        let config_file = vars.get(env_keys::CONFIG_FILE).map(PathBuf::from);
        let environment = Self::detect_environment(vars);

        debug!(
            environment = %environment,
            config_file = ?config_file,
            "Loading dispatcher configuration"
        );

        let config = Self::build(config_file.as_deref(), &environment, vars)?;
        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = %config.environment,
            max_concurrency = ?config.dispatch.max_concurrency,
            project_id = ?config.compute.project_id,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            config_file,
        }))
    }

    /// Wrap an already-built configuration (tests and embedding)
    pub fn from_config(config: DispatcherConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            config_file: None,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.config.environment
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Configuration as JSON with credentials masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    fn build(
        config_file: Option<&Path>,
        environment: &str,
        vars: &HashMap<String, String>,
    ) -> ConfigResult<DispatcherConfig> {
        let mut builder = Config::builder().set_default("environment", environment)?;

        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigurationError::config_file_not_found(path));
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_keys::CONFIG_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.clone().into_iter().collect())),
        );

        if let Some(port) = vars.get(env_keys::PORT) {
            let port: u16 = port.trim().parse().map_err(|_| {
                ConfigurationError::invalid_value(
                    env_keys::PORT,
                    port.clone(),
                    "PORT must be a valid TCP port number",
                )
            })?;
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Detect current environment: VM_LIFECYCLE_ENV || APP_ENV || 'development'
    fn detect_environment(vars: &HashMap<String, String>) -> String {
        vars.get(env_keys::ENVIRONMENT)
            .or_else(|| vars.get(env_keys::APP_ENV))
            .map(|env| env.to_lowercase())
            .unwrap_or_else(|| "development".to_string())
    }

    fn sanitize_config_for_logging(config: &DispatcherConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["token", "secret", "password", "credential"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    /// Recursively mask string values under sensitive keys
    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        if !val.is_null() {
                            *val = serde_json::Value::String("[MASKED]".to_string());
                        }
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}
