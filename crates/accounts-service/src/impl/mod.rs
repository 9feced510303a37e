//! User service implementations.
//!
//! The trait lives in `user_service.rs`; this module holds the business
//! service and the cache-aside decorator that wraps it.

pub mod cached_user_service;
pub mod user_service_impl;

pub use cached_user_service::CachedUserService;
pub use user_service_impl::UserServiceImpl;
