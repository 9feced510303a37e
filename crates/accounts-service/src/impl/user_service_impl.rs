//! Business service backed by the record store.

use crate::dto::{ChangePasswordRequest, CreateUserRequest, UpdateAvatarRequest, UpdateUserRequest};
use crate::metrics::MetricsSink;
use crate::user_service::UserService;
use accounts_core::{AccountError, AccountResult, NewUser, Page, PageRequest, User, UserId, ValidateExt};
use accounts_repository::UserRepository;
use accounts_security::PasswordHasherInterface;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// User service implementation.
pub struct UserServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasherInterface>,
    metrics: Arc<dyn MetricsSink>,
}

impl UserServiceImpl {
    /// Creates a new user service.
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasherInterface>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            metrics,
        }
    }

    fn tracked<T>(&self, operation: &'static str, result: AccountResult<T>) -> AccountResult<T> {
        self.metrics.record_user_operation(operation, result.is_ok());
        result
    }

    async fn find_existing(&self, id: UserId) -> AccountResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AccountError::not_found("User", id))
    }

    async fn create(&self, request: CreateUserRequest) -> AccountResult<User> {
        debug!("Creating user: {}", request.username);

        request.validate_request()?;

        let password_hash = self.password_hasher.hash(&request.password)?;
        let user = self
            .user_repository
            .create(&NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                full_name: request.full_name,
                bio: request.bio,
            })
            .await?;

        info!("User created: {}", user.id);
        Ok(user)
    }

    async fn update(&self, id: UserId, request: UpdateUserRequest) -> AccountResult<User> {
        debug!("Updating user: {}", id);

        request.validate_request()?;

        let user = self
            .user_repository
            .update(id, &request.into_changes())
            .await?;

        info!("User updated: {}", id);
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> AccountResult<()> {
        debug!("Deleting user: {}", id);

        if !self.user_repository.delete(id).await? {
            return Err(AccountError::not_found("User", id));
        }

        info!("User deleted: {}", id);
        Ok(())
    }

    async fn change(&self, id: UserId, request: ChangePasswordRequest) -> AccountResult<()> {
        debug!("Changing password for user: {}", id);

        request.validate_request()?;

        let user = self.find_existing(id).await?;

        if !self
            .password_hasher
            .verify(&request.current_password, &user.password_hash)?
        {
            return Err(AccountError::InvalidCredentials);
        }

        let new_hash = self.password_hasher.hash(&request.new_password)?;
        if !self.user_repository.update_password(id, &new_hash).await? {
            return Err(AccountError::not_found("User", id));
        }

        info!("Password changed for user: {}", id);
        Ok(())
    }

    async fn avatar(&self, id: UserId, request: UpdateAvatarRequest) -> AccountResult<()> {
        debug!("Updating avatar for user: {}", id);

        request.validate_request()?;

        if !self
            .user_repository
            .update_avatar(id, &request.avatar_url)
            .await?
        {
            return Err(AccountError::not_found("User", id));
        }

        info!("Avatar updated for user: {}", id);
        Ok(())
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn create_user(&self, request: CreateUserRequest) -> AccountResult<User> {
        let result = self.create(request).await;
        self.tracked("create", result)
    }

    async fn get_user(&self, id: UserId) -> AccountResult<User> {
        debug!("Getting user: {}", id);

        let result = self.find_existing(id).await;
        self.tracked("get", result)
    }

    async fn get_user_by_username(&self, username: &str) -> AccountResult<User> {
        debug!("Getting user by username: {}", username);

        let result = self
            .user_repository
            .find_by_username(username)
            .await
            .and_then(|user| user.ok_or_else(|| AccountError::not_found("User", username)));
        self.tracked("get_by_username", result)
    }

    async fn get_user_by_email(&self, email: &str) -> AccountResult<User> {
        debug!("Getting user by email: {}", email);

        let result = self
            .user_repository
            .find_by_email(email)
            .await
            .and_then(|user| user.ok_or_else(|| AccountError::not_found("User", email)));
        self.tracked("get_by_email", result)
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> AccountResult<User> {
        let result = self.update(id, request).await;
        self.tracked("update", result)
    }

    async fn delete_user(&self, id: UserId) -> AccountResult<()> {
        let result = self.delete(id).await;
        self.tracked("delete", result)
    }

    async fn search_users(&self, query: &str, page: PageRequest) -> AccountResult<Page<User>> {
        debug!("Searching users: '{}', page: {}, limit: {}", query, page.page, page.limit);

        let result = self.user_repository.search(query.trim(), page).await;
        self.tracked("search", result)
    }

    async fn change_password(&self, id: UserId, request: ChangePasswordRequest) -> AccountResult<()> {
        let result = self.change(id, request).await;
        self.tracked("change_password", result)
    }

    async fn update_avatar(&self, id: UserId, request: UpdateAvatarRequest) -> AccountResult<()> {
        let result = self.avatar(id, request).await;
        self.tracked("update_avatar", result)
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl").finish_non_exhaustive()
    }
}
