//! Shared application state.

use std::sync::Arc;

use packline_queue::Broker;

/// State shared with every handler.
#[derive(Clone)]
pub struct AppState {
    /// Broker handle, for the connectivity probe and manual re-enqueueing
    pub broker: Arc<dyn Broker>,
}

impl AppState {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self { broker }
    }
}
