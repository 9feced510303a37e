//! # Accounts Service
//!
//! Business logic for user accounts plus the cache-aside layer in front of it.
//!
//! ```text
//! CachedUserService ──► UserServiceImpl ──► UserRepository
//!        │
//!        └──► UserCache ──► CacheStore (Redis)
//! ```
//!
//! Both services implement [`UserService`]; the server picks one at startup
//! depending on whether Redis is enabled.

pub mod cache;
pub mod dto;
pub mod r#impl;
pub mod metrics;
pub mod user_service;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::*;
pub use dto::*;
pub use crate::metrics::{MetricsSink, NoopMetrics, PrometheusMetrics};
pub use r#impl::{CachedUserService, UserServiceImpl};
pub use user_service::*;
