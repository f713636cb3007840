//! # Web Trigger Application State

use std::sync::Arc;

use crate::dispatcher::Dispatcher;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub environment: String,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, environment: impl Into<String>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            environment: environment.into(),
        }
    }
}
