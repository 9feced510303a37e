//! Cache-aside infrastructure for user records.
//!
//! [`CacheStore`] is the raw key/value seam (Redis in production),
//! [`UserCache`] keeps the three per-user keys consistent on top of it.

mod error;
pub mod keys;
mod redis_store;
mod store;
mod user_cache;

pub use error::{CacheError, CacheLookup, CacheResult};
pub use redis_store::RedisCacheStore;
pub use store::CacheStore;
pub use user_cache::{UserCache, DEFAULT_OPERATION_TIMEOUT, DEFAULT_USER_TTL};
