//! # Compute Provider Seam
//!
//! Traits the dispatcher uses to reach virtual machines. A resolver turns an
//! [`InstanceRef`] into a [`VmHandle`]; a handle issues `start`/`stop` and gets
//! back a [`LifecycleOperation`] that can be awaited until it resolves.
//!
//! [`gce`] implements these against the Compute Engine REST API.

pub mod credentials;
pub mod error;
pub mod gce;

use async_trait::async_trait;

use crate::request::{InstanceRef, LifecycleCommand};

pub use error::{ComputeError, ComputeResult};
pub use gce::{GceClient, GceInstance, GceOperation, GceResolver};

/// In-flight provider action
#[async_trait]
pub trait LifecycleOperation: Send + Sync {
    /// Provider-assigned operation name
    fn name(&self) -> &str;

    /// Wait until the operation has resolved; `Err` if it resolved with an error
    async fn wait(&self) -> ComputeResult<()>;
}

/// Handle scoped to one instance in one zone
#[async_trait]
pub trait VmHandle: Send + Sync {
    fn instance(&self) -> &InstanceRef;

    async fn start(&self) -> ComputeResult<Box<dyn LifecycleOperation>>;

    async fn stop(&self) -> ComputeResult<Box<dyn LifecycleOperation>>;

    /// Issue whichever call `command` names
    async fn apply(&self, command: LifecycleCommand) -> ComputeResult<Box<dyn LifecycleOperation>> {
        match command {
            LifecycleCommand::Start => self.start().await,
            LifecycleCommand::Stop => self.stop().await,
        }
    }
}

/// Produces handles for `(name, zone)` pairs
#[async_trait]
pub trait VmHandleResolver: Send + Sync {
    async fn resolve(&self, instance: &InstanceRef) -> ComputeResult<Box<dyn VmHandle>>;
}
