#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # VM Lifecycle Dispatcher
//!
//! Scheduled bulk start/stop for Compute Engine virtual machines.
//!
//! ## Overview
//!
//! A scheduler publishes an event whose data is a base64-encoded JSON
//! request:
//!
//! ```json
//! { "command": "stop", "instances": [{ "name": "vm-1", "zone": "us-central1-a" }] }
//! ```
//!
//! The [`Dispatcher`] decodes it, issues the lifecycle call for every listed
//! instance concurrently, waits for each long-running operation to resolve,
//! and reports a single status through a completion callback. Unknown
//! commands are logged and ignored; any single failure fails the batch.
//!
//! ## Module Organization
//!
//! - [`request`] - Lifecycle request model and payload decoding
//! - [`event`] - Inbound event shapes (bare event, Pub/Sub push envelope)
//! - [`dispatcher`] - Fan-out and completion signalling
//! - [`compute`] - Provider seam and the Compute Engine implementation
//! - [`web`] - HTTP trigger endpoint
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging
//! - [`error`] - Dispatch error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vm_lifecycle::compute::GceResolver;
//! use vm_lifecycle::config::ConfigManager;
//! use vm_lifecycle::{Dispatcher, ScheduledEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//! let dispatcher = Dispatcher::new(
//!     Arc::new(GceResolver::new(config.compute.clone())),
//!     config.dispatch.clone(),
//! );
//!
//! let event = ScheduledEvent::new("eyJjb21tYW5kIjoic3RvcCIsImluc3RhbmNlcyI6W119");
//! dispatcher
//!     .run_handler(&event, |result| match result {
//!         Ok(outcome) => println!("{:?}", outcome.message()),
//!         Err(e) => eprintln!("{e}"),
//!     })
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod compute;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod logging;
pub mod request;
pub mod web;

pub use compute::{ComputeError, LifecycleOperation, VmHandle, VmHandleResolver};
pub use config::{ConfigManager, DispatcherConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{DispatchError, DispatchResult, UnknownCommandError};
pub use event::{InboundEvent, PushEnvelope, ScheduledEvent};
pub use request::{InstanceRef, LifecycleCommand, LifecycleRequest, RawLifecycleRequest};
