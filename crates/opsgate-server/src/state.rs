use opsgate_core::service::ExecService;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ExecService>,
}

impl AppState {
    pub fn new(service: Arc<ExecService>) -> Self {
        Self { service }
    }
}
