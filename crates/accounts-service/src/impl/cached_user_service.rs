//! Cache-aside decorator over any [`UserService`].
//!
//! Reads consult the [`UserCache`] first and fall through to the wrapped
//! service on a miss, repopulating all three keys. Mutations go to the wrapped
//! service first; the cache is only touched after the store confirmed the
//! change. Cache failures never reach the caller: they are logged and the
//! request continues as if the entry were missing.

use crate::cache::{CacheLookup, CacheResult, UserCache};
use crate::dto::{ChangePasswordRequest, CreateUserRequest, UpdateAvatarRequest, UpdateUserRequest};
use crate::metrics::MetricsSink;
use crate::user_service::UserService;
use accounts_core::{AccountResult, Page, PageRequest, User, UserId};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Caching [`UserService`] decorator.
pub struct CachedUserService {
    inner: Arc<dyn UserService>,
    cache: UserCache,
    metrics: Arc<dyn MetricsSink>,
}

impl CachedUserService {
    /// Wraps `inner` with `cache`.
    pub fn new(inner: Arc<dyn UserService>, cache: UserCache, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            inner,
            cache,
            metrics,
        }
    }

    async fn read_through<L, D>(&self, lookup: L, load: D, axis: &'static str) -> AccountResult<User>
    where
        L: Future<Output = CacheResult<CacheLookup<User>>> + Send,
        D: Future<Output = AccountResult<User>> + Send,
    {
        match lookup.await {
            Ok(CacheLookup::Hit(user)) => {
                debug!(user_id = %user.id, axis, "Cache hit");
                self.metrics.increment_cache_hit();
                return Ok(user);
            }
            Ok(CacheLookup::Miss) => {
                debug!(axis, "Cache miss");
                self.metrics.increment_cache_miss();
            }
            Err(e) => {
                warn!(axis, error = %e, "Cache lookup failed, reading from store");
            }
        }

        let user = load.await?;
        self.remember(&user).await;
        Ok(user)
    }

    async fn remember(&self, user: &User) {
        if let Err(e) = self.cache.put(user).await {
            warn!(user_id = %user.id, error = %e, "Failed to cache user");
        }
    }

    async fn forget(&self, snapshot: &User) {
        if let Err(e) = self.cache.invalidate(snapshot).await {
            warn!(user_id = %snapshot.id, error = %e, "Failed to invalidate cached user");
        }
    }

    async fn forget_id(&self, id: UserId) {
        if let Err(e) = self.cache.invalidate_by_id(id).await {
            warn!(user_id = %id, error = %e, "Failed to invalidate cached user");
        }
    }
}

#[async_trait]
impl UserService for CachedUserService {
    async fn create_user(&self, request: CreateUserRequest) -> AccountResult<User> {
        debug!(username = %request.username, "Creating user through cache");

        let user = self.inner.create_user(request).await?;
        self.remember(&user).await;
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> AccountResult<User> {
        debug!(user_id = %id, "Getting user through cache");

        self.read_through(self.cache.get_by_id(id), self.inner.get_user(id), "id")
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> AccountResult<User> {
        debug!(username, "Getting user by username through cache");

        self.read_through(
            self.cache.get_by_username(username),
            self.inner.get_user_by_username(username),
            "username",
        )
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> AccountResult<User> {
        debug!(email, "Getting user by email through cache");

        self.read_through(
            self.cache.get_by_email(email),
            self.inner.get_user_by_email(email),
            "email",
        )
        .await
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> AccountResult<User> {
        debug!(user_id = %id, "Updating user through cache");

        let before = self.inner.get_user(id).await?;
        let after = self.inner.update_user(id, request).await?;

        self.forget(&before).await;
        self.remember(&after).await;
        Ok(after)
    }

    async fn delete_user(&self, id: UserId) -> AccountResult<()> {
        debug!(user_id = %id, "Deleting user through cache");

        let snapshot = match self.inner.get_user(id).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                self.forget_id(id).await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.inner.delete_user(id).await?;
        self.forget(&snapshot).await;
        info!(user_id = %id, "Evicted deleted user from cache");
        Ok(())
    }

    async fn search_users(&self, query: &str, page: PageRequest) -> AccountResult<Page<User>> {
        debug!(query, page = page.page, limit = page.limit, "Searching users, caching results");

        let page = self.inner.search_users(query, page).await?;
        for user in &page.content {
            self.remember(user).await;
        }
        Ok(page)
    }

    async fn change_password(&self, id: UserId, request: ChangePasswordRequest) -> AccountResult<()> {
        debug!(user_id = %id, "Changing password through cache");

        self.inner.change_password(id, request).await?;
        self.forget_id(id).await;
        Ok(())
    }

    async fn update_avatar(&self, id: UserId, request: UpdateAvatarRequest) -> AccountResult<()> {
        debug!(user_id = %id, "Updating avatar through cache");

        self.inner.update_avatar(id, request).await?;
        self.forget_id(id).await;
        Ok(())
    }
}

impl std::fmt::Debug for CachedUserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedUserService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
