//! User service trait definition.

use crate::dto::{ChangePasswordRequest, CreateUserRequest, UpdateAvatarRequest, UpdateUserRequest};
use accounts_core::{AccountResult, Page, PageRequest, User, UserId};
use async_trait::async_trait;

/// User service trait.
///
/// Implemented by the business service and by the caching decorator in front
/// of it. Callers cannot tell the two apart: both return the same records
/// and the same errors.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Creates a new user.
    async fn create_user(&self, request: CreateUserRequest) -> AccountResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> AccountResult<User>;

    /// Gets a user by username.
    async fn get_user_by_username(&self, username: &str) -> AccountResult<User>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> AccountResult<User>;

    /// Updates a user's profile.
    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> AccountResult<User>;

    /// Deletes a user.
    async fn delete_user(&self, id: UserId) -> AccountResult<()>;

    /// Searches users by username, email or full name.
    async fn search_users(&self, query: &str, page: PageRequest) -> AccountResult<Page<User>>;

    /// Changes a user's password after verifying the current one.
    async fn change_password(&self, id: UserId, request: ChangePasswordRequest) -> AccountResult<()>;

    /// Replaces a user's avatar.
    async fn update_avatar(&self, id: UserId, request: UpdateAvatarRequest) -> AccountResult<()>;
}
