//! # Lifecycle Dispatcher
//!
//! Decodes a scheduled event, validates its command, and fans the matching
//! lifecycle call out over every listed instance. The batch is all-or-nothing:
//! every launched call is allowed to settle, then any single failure fails the
//! whole batch and the caller only learns that the batch failed.
//!
//! ```text
//! event ─► decode ─► command? ─┬─ unknown ─► warn, Ignored
//!                              └─ start/stop ─► resolve ─► call ─► wait   (per instance, concurrent)
//!                                                     └────────► join ─► status message
//! ```

use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::compute::{ComputeError, ComputeResult, VmHandleResolver};
use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::event::ScheduledEvent;
use crate::logging::{log_error, log_lifecycle_operation};
use crate::request::{InstanceRef, LifecycleCommand, LifecycleRequest, RawLifecycleRequest};

/// Successful end of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every instance's operation resolved
    Completed {
        command: LifecycleCommand,
        instance_count: usize,
        message: String,
    },
    /// Command outside `{start, stop}`; nothing was called
    Ignored { command: String },
}

impl DispatchOutcome {
    /// Status string reported through the completion signal
    pub fn message(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Completed { message, .. } => Some(message.as_str()),
            DispatchOutcome::Ignored { .. } => None,
        }
    }
}

/// Bulk start/stop dispatcher
#[derive(Clone)]
pub struct Dispatcher {
    resolver: Arc<dyn VmHandleResolver>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(resolver: Arc<dyn VmHandleResolver>, config: DispatchConfig) -> Self {
        Self { resolver, config }
    }

    /// Dispatcher with unbounded fan-out
    pub fn unbounded(resolver: Arc<dyn VmHandleResolver>) -> Self {
        Self::new(resolver, DispatchConfig::default())
    }

    /// Handle one event and hand the result to `completion` exactly once.
    ///
    /// Errors are logged here, at the top level, before being forwarded.
    pub async fn run_handler<F>(&self, event: &ScheduledEvent, completion: F)
    where
        F: FnOnce(DispatchResult<DispatchOutcome>),
    {
        let result = self.handle_event(event).await;

        match &result {
            Ok(outcome) => {
                if let Some(message) = outcome.message() {
                    info!("{message}");
                }
            }
            Err(e) => log_error("dispatcher", "run_handler", &e.to_string(), Some(e.kind())),
        }

        completion(result);
    }

    /// Decode, validate and execute one event
    pub async fn handle_event(&self, event: &ScheduledEvent) -> DispatchResult<DispatchOutcome> {
        let span = info_span!(
            "lifecycle_event",
            invocation_id = %Uuid::new_v4(),
            message_id = event.message_id.as_deref().unwrap_or("-"),
        );

        self.dispatch_event(event).instrument(span).await
    }

    async fn dispatch_event(&self, event: &ScheduledEvent) -> DispatchResult<DispatchOutcome> {
        let raw = RawLifecycleRequest::decode(&event.data)?;

        let command = match raw.command() {
            Ok(command) => command,
            Err(unknown) => {
                warn!(command = %unknown.command, "Wrong instruction: {}", unknown.command);
                return Ok(DispatchOutcome::Ignored {
                    command: unknown.command,
                });
            }
        };

        let request = raw.into_request(command)?;
        self.execute(request).await
    }

    /// Fan the request's command out over its instances and join
    pub async fn execute(&self, request: LifecycleRequest) -> DispatchResult<DispatchOutcome> {
        let command = request.command;
        let instance_count = request.instances.len();

        debug!(
            command = %command,
            instance_count = instance_count,
            max_concurrency = ?self.config.max_concurrency,
            "Dispatching lifecycle batch"
        );

        let calls = request
            .instances
            .into_iter()
            .map(|instance| async move { self.run_instance(command, &instance).await });

        let results: Vec<ComputeResult<()>> = match self.config.max_concurrency {
            None => join_all(calls).await,
            Some(limit) => stream::iter(calls).buffer_unordered(limit).collect().await,
        };

        let failures: Vec<ComputeError> = results.into_iter().filter_map(Result::err).collect();
        if let Some(first) = failures.first() {
            warn!(
                command = %command,
                failed = failures.len(),
                instance_count = instance_count,
                "Lifecycle batch failed"
            );
            return Err(DispatchError::lifecycle_call(command, first.to_string()));
        }

        Ok(DispatchOutcome::Completed {
            command,
            instance_count,
            message: command.success_message().to_string(),
        })
    }

    /// Resolve, call and wait for a single instance
    async fn run_instance(&self, command: LifecycleCommand, instance: &InstanceRef) -> ComputeResult<()> {
        let result = self.call_instance(command, instance).await;

        if let Err(e) = &result {
            warn!(
                command = %command,
                instance = %instance.name,
                zone = %instance.zone,
                error = %e,
                "Lifecycle call failed"
            );
        }
        result
    }

    async fn call_instance(&self, command: LifecycleCommand, instance: &InstanceRef) -> ComputeResult<()> {
        let handle = self.resolver.resolve(instance).await?;
        let operation = handle.apply(command).await?;
        log_lifecycle_operation(command, instance, "pending", Some(operation.name()));

        operation.wait().await?;
        log_lifecycle_operation(command, instance, "done", None);
        Ok(())
    }
}
