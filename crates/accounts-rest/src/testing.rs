//! Router fixtures shared by the controller tests.

use crate::{create_router, AppState};
use accounts_config::ServerConfig;
use accounts_core::{AccountResult, HealthCheck, Page, PageRequest, User, UserId};
use accounts_service::{
    ChangePasswordRequest, CreateUserRequest, UpdateAvatarRequest, UpdateUserRequest, UserService,
};
use axum::{response::Response, Router};
use chrono::Utc;
use http_body_util::BodyExt;
use mockall::mock;
use std::sync::Arc;

mock! {
    pub UserService {}

    #[async_trait::async_trait]
    impl UserService for UserService {
        async fn create_user(&self, request: CreateUserRequest) -> AccountResult<User>;
        async fn get_user(&self, id: UserId) -> AccountResult<User>;
        async fn get_user_by_username(&self, username: &str) -> AccountResult<User>;
        async fn get_user_by_email(&self, email: &str) -> AccountResult<User>;
        async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> AccountResult<User>;
        async fn delete_user(&self, id: UserId) -> AccountResult<()>;
        async fn search_users(&self, query: &str, page: PageRequest) -> AccountResult<Page<User>>;
        async fn change_password(&self, id: UserId, request: ChangePasswordRequest) -> AccountResult<()>;
        async fn update_avatar(&self, id: UserId, request: UpdateAvatarRequest) -> AccountResult<()>;
    }
}

/// Router over a mocked service with no health checks.
pub fn app(service: MockUserService) -> Router {
    app_with_checks(service, Vec::new())
}

pub fn app_with_checks(service: MockUserService, checks: Vec<Arc<dyn HealthCheck>>) -> Router {
    let state = AppState::new(Arc::new(service), checks);
    create_router(state, &ServerConfig::default())
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn sample_user(id: i64, username: &str, email: &str) -> User {
    let now = Utc::now();
    User {
        id: UserId(id),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        full_name: None,
        bio: None,
        avatar_url: None,
        created_at: now,
        updated_at: now,
    }
}

