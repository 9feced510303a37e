//! Multi-index user cache.
//!
//! A user is cached under three keys (id, email, username), each holding the
//! full JSON record. Writes always replace all three; invalidation removes all
//! three as derived from a snapshot taken *before* the record changed, so an
//! old email or username cannot keep resolving to a stale entry.
//!
//! The three keys are written independently, without a transaction. A
//! concurrent reader may observe a window where only some keys carry the new
//! version; that window is bounded by one operation and by the TTL.

use super::{keys, CacheError, CacheLookup, CacheResult, CacheStore};
use crate::metrics::MetricsSink;
use accounts_core::{User, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default TTL of all three user keys.
pub const DEFAULT_USER_TTL: Duration = Duration::from_secs(30 * 60);

/// Default deadline of a single store call.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(250);

/// Read-through / invalidate protocol over a [`CacheStore`].
#[derive(Clone)]
pub struct UserCache {
    store: Arc<dyn CacheStore>,
    metrics: Arc<dyn MetricsSink>,
    ttl: Duration,
    timeout: Duration,
}

impl UserCache {
    /// Creates a cache with the default TTL and deadline.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            store,
            metrics,
            ttl: DEFAULT_USER_TTL,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the TTL applied on `put`.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the per-call deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Looks a user up by id.
    pub async fn get_by_id(&self, id: UserId) -> CacheResult<CacheLookup<User>> {
        self.lookup(keys::user_by_id(id)).await
    }

    /// Looks a user up by email.
    pub async fn get_by_email(&self, email: &str) -> CacheResult<CacheLookup<User>> {
        self.lookup(keys::user_by_email(email)).await
    }

    /// Looks a user up by username.
    pub async fn get_by_username(&self, username: &str) -> CacheResult<CacheLookup<User>> {
        self.lookup(keys::user_by_username(username)).await
    }

    /// Writes the full record under all three keys.
    ///
    /// Every key is attempted even if an earlier one fails. The call succeeds
    /// when the id key was written; failures on the secondary keys are only
    /// logged because the next miss on that axis repopulates them.
    pub async fn put(&self, user: &User) -> CacheResult<()> {
        let payload = serde_json::to_string(user)?;
        let [id_key, email_key, username_key] = keys::user_keys(user);

        let id_result = self.set(&id_key, &payload).await;
        let email_result = self.set(&email_key, &payload).await;
        let username_result = self.set(&username_key, &payload).await;

        let id_failed = id_result.is_err();
        let failures = collect_failures([
            (id_key, id_result),
            (email_key, email_result),
            (username_key, username_result),
        ]);

        for (key, error) in &failures {
            warn!(user_id = %user.id, key = %key, error = %error, "Failed to cache user entry");
        }

        if id_failed {
            return Err(aggregate(failures));
        }
        debug!(user_id = %user.id, "Cached user under all indexes");
        Ok(())
    }

    /// Deletes all three keys derived from `snapshot`.
    ///
    /// Pass the record as it was *before* the mutation so that a changed
    /// email or username has its old key removed. Deleting absent keys is
    /// not an error, so repeated calls are harmless.
    pub async fn invalidate(&self, snapshot: &User) -> CacheResult<()> {
        let [id_key, email_key, username_key] = keys::user_keys(snapshot);

        let id_result = self.delete(&id_key).await;
        let email_result = self.delete(&email_key).await;
        let username_result = self.delete(&username_key).await;

        let failures = collect_failures([
            (id_key, id_result),
            (email_key, email_result),
            (username_key, username_result),
        ]);
        if failures.is_empty() {
            debug!(user_id = %snapshot.id, "Invalidated user cache entries");
            Ok(())
        } else {
            Err(aggregate(failures))
        }
    }

    /// Invalidates a user known only by id.
    ///
    /// The cached record (if any) supplies the email and username keys. On a
    /// miss or a failed lookup only the id key can be derived and deleted.
    pub async fn invalidate_by_id(&self, id: UserId) -> CacheResult<()> {
        match self.get_by_id(id).await {
            Ok(CacheLookup::Hit(user)) => return self.invalidate(&user).await,
            Ok(CacheLookup::Miss) => {}
            Err(e) => {
                debug!(user_id = %id, error = %e, "Lookup before invalidation failed, deleting id key only");
            }
        }
        self.delete(&keys::user_by_id(id)).await.map(|_| ())
    }

    async fn lookup(&self, key: String) -> CacheResult<CacheLookup<User>> {
        let raw = self.timed("get", self.store.get(&key)).await?;
        raw.try_map(|raw| serde_json::from_str::<User>(&raw))
            .map_err(|e| {
                warn!(key = %key, error = %e, "Undecodable user cache entry");
                CacheError::Serialization(e)
            })
    }

    async fn set(&self, key: &str, payload: &str) -> CacheResult<()> {
        self.timed("set", self.store.set(key, payload, self.ttl)).await
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.timed("delete", self.store.delete(key)).await
    }

    /// Runs one store call under the deadline and records its latency.
    async fn timed<T, F>(&self, operation: &'static str, call: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>>,
    {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        };
        self.metrics
            .record_cache_operation_duration(operation, started.elapsed());
        result
    }
}

impl std::fmt::Debug for UserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCache")
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn collect_failures<T, const N: usize>(
    results: [(String, CacheResult<T>); N],
) -> Vec<(String, CacheError)> {
    results
        .into_iter()
        .filter_map(|(key, result)| result.err().map(|e| (key, e)))
        .collect()
}

fn aggregate(failures: Vec<(String, CacheError)>) -> CacheError {
    let reason = failures
        .iter()
        .map(|(key, e)| format!("{key}: {e}"))
        .collect::<Vec<_>>()
        .join("; ");
    CacheError::Partial {
        keys: failures.into_iter().map(|(key, _)| key).collect(),
        reason,
    }
}
