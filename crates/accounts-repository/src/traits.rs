//! Repository trait definitions.

use accounts_core::{AccountResult, NewUser, Page, PageRequest, User, UserChanges, UserId};
use async_trait::async_trait;

/// Authoritative store for user records.
///
/// Lookups return `None` for a missing row. `update` reports a missing row as
/// `AccountError::NotFound`; `create` and `update` report unique collisions as
/// `AccountError::AlreadyExists`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns it with its assigned id and timestamps.
    async fn create(&self, user: &NewUser) -> AccountResult<User>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> AccountResult<Option<User>>;

    /// Finds a user by username.
    async fn find_by_username(&self, username: &str) -> AccountResult<Option<User>>;

    /// Finds a user by email.
    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>>;

    /// Applies a partial update and returns the new record.
    async fn update(&self, id: UserId, changes: &UserChanges) -> AccountResult<User>;

    /// Deletes a user. Returns whether the row existed.
    async fn delete(&self, id: UserId) -> AccountResult<bool>;

    /// Case-insensitive substring search over username, email and full name.
    async fn search(&self, query: &str, page: PageRequest) -> AccountResult<Page<User>>;

    /// Replaces the password hash. Returns whether the row existed.
    async fn update_password(&self, id: UserId, password_hash: &str) -> AccountResult<bool>;

    /// Replaces the avatar URL. Returns whether the row existed.
    async fn update_avatar(&self, id: UserId, avatar_url: &str) -> AccountResult<bool>;
}
