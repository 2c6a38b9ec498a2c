//! Provider configuration and the resource/data source registry.
//!
//! # Design
//! `configure` turns provider settings into a ready `TaskClient`. The service
//! host comes from the `host` setting, or from `TASKSERV_HOST` when the
//! setting is absent; with neither, configuration fails with a diagnostic.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;
use taskserv_core::{ClientConfig, TaskClient, UreqTransport, DEFAULT_TIMEOUT};
use tracing::info;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::operation::TaskOperation;
use crate::schema::{provider_schema, task_data_source_schema, task_resource_schema, Block, SchemaError};

/// Environment variable consulted when `host` is not configured.
pub const HOST_ENV: &str = "TASKSERV_HOST";

pub const RESOURCE_TASK: &str = "taskserv_task";
pub const DATA_SOURCE_TASKS: &str = "taskserv_tasks";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub host: Option<String>,
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Read `host` and `timeout_secs` from a provider configuration block.
    pub fn from_value(config: &Value) -> Result<Self, SchemaError> {
        let attributes = config.as_object().ok_or(SchemaError::NotAnObject)?;
        provider_schema().validate_config(attributes)?;

        let host = attributes.get("host").and_then(Value::as_str).map(str::to_string);
        let timeout = match attributes.get("timeout_secs").and_then(Value::as_i64) {
            Some(secs) => Some(Duration::from_secs(u64::try_from(secs).map_err(|_| {
                SchemaError::TypeMismatch {
                    path: "timeout_secs".to_string(),
                    expected: "non-negative int",
                }
            })?)),
            None => None,
        };
        Ok(Self { host, timeout })
    }
}

/// Pick the configured host, falling back to the environment value.
fn resolve_host(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or(from_env.filter(|h| !h.is_empty()))
}

#[derive(Debug, Clone, Default)]
pub struct TaskProvider {
    operation: TaskOperation,
}

impl TaskProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> Block {
        provider_schema()
    }

    pub fn resources(&self) -> BTreeMap<&'static str, Block> {
        BTreeMap::from([(RESOURCE_TASK, task_resource_schema())])
    }

    pub fn data_sources(&self) -> BTreeMap<&'static str, Block> {
        BTreeMap::from([(DATA_SOURCE_TASKS, task_data_source_schema())])
    }

    pub fn operation(&self) -> &TaskOperation {
        &self.operation
    }

    /// Build the client every resource operation will use.
    pub fn configure(&self, config: &ProviderConfig) -> Result<TaskClient<UreqTransport>, Diagnostics> {
        self.configure_with_env(config, std::env::var(HOST_ENV).ok())
    }

    fn configure_with_env(
        &self,
        config: &ProviderConfig,
        env_host: Option<String>,
    ) -> Result<TaskClient<UreqTransport>, Diagnostics> {
        let Some(host) = resolve_host(config.host.as_deref(), env_host) else {
            return Err(vec![Diagnostic::error(
                "Missing Task Service host",
                format!("Set 'host' in the provider configuration or the {HOST_ENV} environment variable"),
            )]);
        };
        let timeout = config.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(vec![Diagnostic::error(
                "Invalid provider configuration",
                "'timeout_secs' must be greater than zero",
            )]);
        }

        info!(%host, ?timeout, "configuring Task Service client");
        Ok(TaskClient::from_config(&ClientConfig::new(&host).with_timeout(timeout)))
    }
}
