//! Redis-backed cache store.

use super::{CacheError, CacheLookup, CacheResult, CacheStore};
use accounts_core::{HealthCheck, HealthStatus};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache store on a shared deadpool Redis pool.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Arc<Pool>,
}

impl RedisCacheStore {
    /// Creates a store on an existing pool.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> CacheResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Unavailable(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<CacheLookup> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Command(format!("GET '{}': {}", key, e)))?;

        Ok(match value {
            Some(value) => CacheLookup::Hit(value),
            None => {
                debug!("Cache miss for key '{}'", key);
                CacheLookup::Miss
            }
        })
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| CacheError::Command(format!("SETEX '{}': {}", key, e)))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let deleted: i64 = conn
            .del(key)
            .await
            .map_err(|e| CacheError::Command(format!("DEL '{}': {}", key, e)))?;

        Ok(deleted > 0)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let _: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Command(format!("PING: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for RedisCacheStore {
    async fn check(&self) -> HealthStatus {
        match self.ping().await {
            Ok(()) => HealthStatus::up("redis"),
            Err(e) => HealthStatus::down("redis", e.to_string()),
        }
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore").finish_non_exhaustive()
    }
}
