//! Key/value cache store abstraction.

use super::{CacheLookup, CacheResult};
use async_trait::async_trait;
use std::time::Duration;

/// A key/value store with per-key TTL.
///
/// A missing key is [`CacheLookup::Miss`], never an error. Every other
/// failure (connection, protocol, deadline) is a [`super::CacheError`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetches the raw value stored under `key`.
    async fn get(&self, key: &str) -> CacheResult<CacheLookup>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Round-trips to the store.
    async fn ping(&self) -> CacheResult<()>;
}
