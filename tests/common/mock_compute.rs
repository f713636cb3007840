use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vm_lifecycle::compute::{ComputeError, ComputeResult, LifecycleOperation, VmHandle, VmHandleResolver};
use vm_lifecycle::{InstanceRef, LifecycleCommand};

/// How the mock provider treats a given instance name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Call accepted, operation resolves successfully
    Succeed,
    /// Handle cannot be resolved; no call is recorded
    FailResolve,
    /// The start/stop call itself is rejected
    RejectCall,
    /// Call accepted, operation resolves with an error
    FailOperation,
}

/// One lifecycle call observed by the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: LifecycleCommand,
    pub instance: InstanceRef,
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<RecordedCall>>,
    resolved: AtomicUsize,
    waited: AtomicUsize,
    behaviors: Mutex<HashMap<String, MockBehavior>>,
    operation_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockState {
    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Recording compute provider for dispatcher tests
#[derive(Clone, Default)]
pub struct MockResolver {
    state: Arc<MockState>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the behavior for a specific instance name
    pub fn with_behavior(self, name: &str, behavior: MockBehavior) -> Self {
        self.state
            .behaviors
            .lock()
            .insert(name.to_string(), behavior);
        self
    }

    /// Make every operation take `delay` to resolve
    pub fn with_operation_delay(self, delay: Duration) -> Self {
        *self.state.operation_delay.lock() = delay;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().len()
    }

    /// Number of calls recorded for a specific instance and command
    pub fn calls_for(&self, command: LifecycleCommand, instance: &InstanceRef) -> usize {
        self.state
            .calls
            .lock()
            .iter()
            .filter(|call| call.command == command && &call.instance == instance)
            .count()
    }

    pub fn resolved_count(&self) -> usize {
        self.state.resolved.load(Ordering::SeqCst)
    }

    pub fn waited_count(&self) -> usize {
        self.state.waited.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    fn behavior_for(&self, name: &str) -> MockBehavior {
        self.state
            .behaviors
            .lock()
            .get(name)
            .copied()
            .unwrap_or(MockBehavior::Succeed)
    }
}

#[async_trait]
impl VmHandleResolver for MockResolver {
    async fn resolve(&self, instance: &InstanceRef) -> ComputeResult<Box<dyn VmHandle>> {
        self.state.resolved.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior_for(&instance.name);
        if behavior == MockBehavior::FailResolve {
            return Err(ComputeError::credentials("mock credentials unavailable"));
        }

        Ok(Box::new(MockHandle {
            instance: instance.clone(),
            behavior,
            state: self.state.clone(),
        }))
    }
}

struct MockHandle {
    instance: InstanceRef,
    behavior: MockBehavior,
    state: Arc<MockState>,
}

impl MockHandle {
    fn record(&self, command: LifecycleCommand) -> ComputeResult<Box<dyn LifecycleOperation>> {
        self.state.calls.lock().push(RecordedCall {
            command,
            instance: self.instance.clone(),
        });
        self.state.enter();

        if self.behavior == MockBehavior::RejectCall {
            self.state.leave();
            return Err(ComputeError::api(
                format!("instances.{command}"),
                400,
                format!("mock rejected {command} for {}", self.instance.name),
            ));
        }

        Ok(Box::new(MockOperation {
            name: format!("operation-{command}-{}", self.instance.name),
            fail: self.behavior == MockBehavior::FailOperation,
            delay: *self.state.operation_delay.lock(),
            state: self.state.clone(),
        }))
    }
}

#[async_trait]
impl VmHandle for MockHandle {
    fn instance(&self) -> &InstanceRef {
        &self.instance
    }

    async fn start(&self) -> ComputeResult<Box<dyn LifecycleOperation>> {
        self.record(LifecycleCommand::Start)
    }

    async fn stop(&self) -> ComputeResult<Box<dyn LifecycleOperation>> {
        self.record(LifecycleCommand::Stop)
    }
}

struct MockOperation {
    name: String,
    fail: bool,
    delay: Duration,
    state: Arc<MockState>,
}

#[async_trait]
impl LifecycleOperation for MockOperation {
    fn name(&self) -> &str {
        &self.name
    }

    async fn wait(&self) -> ComputeResult<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.state.waited.fetch_add(1, Ordering::SeqCst);
        self.state.leave();

        if self.fail {
            return Err(ComputeError::operation_failed(
                self.name.clone(),
                "mock operation resolved with error",
            ));
        }
        Ok(())
    }
}
