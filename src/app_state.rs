use std::sync::Arc;

use crate::services::{gateway::ColorizeClient, storage::ImageStore, tracker::JobTracker};

/// Shared application state passed to all route handlers.
///
/// The tracker holds its own handles to the gateway and the store; the
/// copies here are for the health endpoint.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<JobTracker>,
    pub gateway: Arc<ColorizeClient>,
    pub storage: Arc<ImageStore>,
}

impl AppState {
    pub fn new(
        tracker: Arc<JobTracker>,
        gateway: Arc<ColorizeClient>,
        storage: Arc<ImageStore>,
    ) -> Self {
        Self {
            tracker,
            gateway,
            storage,
        }
    }
}
