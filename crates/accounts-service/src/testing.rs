//! In-process fakes shared by the cache and decorator tests.

use crate::cache::{CacheError, CacheLookup, CacheResult, CacheStore};
use crate::metrics::MetricsSink;
use accounts_core::{User, UserId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One call observed by [`FakeCacheStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCall {
    Get(String),
    Set(String),
    Delete(String),
}

/// Map-backed [`CacheStore`] with a call log and fault injection.
#[derive(Default)]
pub struct FakeCacheStore {
    entries: Mutex<HashMap<String, (String, Duration)>>,
    calls: Mutex<Vec<CacheCall>>,
    failing_keys: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl FakeCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with `CacheError::Unavailable`.
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Makes every call touching `key` fail with `CacheError::Command`.
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Delays every call by `delay` before answering.
    pub fn delay_all(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Stores a raw value directly, bypassing the call log.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Duration::from_secs(60)));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    /// Deserializes the entry under `key`.
    pub fn user(&self, key: &str) -> Option<User> {
        self.raw(key).map(|raw| serde_json::from_str(&raw).unwrap())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<CacheCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, call: CacheCall) -> CacheResult<()> {
        let key = match &call {
            CacheCall::Get(key) | CacheCall::Set(key) | CacheCall::Delete(key) => key.clone(),
        };
        self.calls.lock().unwrap().push(call);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".to_string()));
        }
        if self.failing_keys.lock().unwrap().contains(&key) {
            return Err(CacheError::Command(format!("injected failure on '{key}'")));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for FakeCacheStore {
    async fn get(&self, key: &str) -> CacheResult<CacheLookup> {
        self.enter(CacheCall::Get(key.to_string())).await?;
        Ok(self
            .raw(key)
            .map_or(CacheLookup::Miss, CacheLookup::Hit))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.enter(CacheCall::Set(key.to_string())).await?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.enter(CacheCall::Delete(key.to_string())).await?;
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    async fn ping(&self) -> CacheResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

/// [`MetricsSink`] that remembers what it was told.
#[derive(Default)]
pub struct RecordingMetrics {
    hits: AtomicUsize,
    misses: AtomicUsize,
    durations: Mutex<Vec<&'static str>>,
    user_operations: Mutex<Vec<(&'static str, bool)>>,
}

impl RecordingMetrics {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::SeqCst)
    }

    /// Operations whose duration was recorded, in order.
    pub fn timed_operations(&self) -> Vec<&'static str> {
        self.durations.lock().unwrap().clone()
    }

    pub fn user_operations(&self) -> Vec<(&'static str, bool)> {
        self.user_operations.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingMetrics {
    fn increment_cache_hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_cache_miss(&self) {
        self.misses.fetch_add(1, Ordering::SeqCst);
    }

    fn record_cache_operation_duration(&self, operation: &'static str, _duration: Duration) {
        self.durations.lock().unwrap().push(operation);
    }

    fn record_user_operation(&self, operation: &'static str, success: bool) {
        self.user_operations.lock().unwrap().push((operation, success));
    }
}

/// A fully populated record.
pub fn sample_user(id: i64, username: &str, email: &str) -> User {
    let now = Utc::now();
    User {
        id: UserId(id),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
        full_name: Some("Alice Liddell".to_string()),
        bio: None,
        avatar_url: Some("https://cdn.example.com/a.png".to_string()),
        created_at: now,
        updated_at: now,
    }
}
