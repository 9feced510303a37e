//! Application state for Axum handlers.

use accounts_core::HealthCheck;
use accounts_service::UserService;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub health_checks: Arc<[Arc<dyn HealthCheck>]>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(user_service: Arc<dyn UserService>, health_checks: Vec<Arc<dyn HealthCheck>>) -> Self {
        Self {
            user_service,
            health_checks: health_checks.into(),
        }
    }
}
