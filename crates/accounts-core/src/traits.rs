//! Shared traits.

use async_trait::async_trait;
use serde::Serialize;

/// Health of a single backing dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Component name (`postgres`, `redis`, ...).
    pub component: &'static str,
    /// Whether the component answered.
    pub healthy: bool,
    /// Failure detail when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthStatus {
    #[must_use]
    pub const fn up(component: &'static str) -> Self {
        Self {
            component,
            healthy: true,
            detail: None,
        }
    }

    #[must_use]
    pub fn down(component: &'static str, detail: impl Into<String>) -> Self {
        Self {
            component,
            healthy: false,
            detail: Some(detail.into()),
        }
    }
}

/// Implemented by anything the readiness probe should ping.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Checks the dependency and reports its status.
    async fn check(&self) -> HealthStatus;
}
