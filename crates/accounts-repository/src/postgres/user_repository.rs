//! Postgres user repository implementation.

use crate::{traits::UserRepository, DatabasePool};
use accounts_core::{AccountError, AccountResult, NewUser, Page, PageRequest, User, UserChanges, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::{debug, error};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, bio, avatar_url, created_at, updated_at";

/// Postgres user repository implementation.
#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: DatabasePool,
}

impl PgUserRepository {
    /// Creates a new Postgres user repository.
    #[must_use]
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    full_name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            bio: row.bio,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Converts a driver error, logging infrastructure failures.
fn store_error(operation: &'static str, err: sqlx::Error) -> AccountError {
    let mapped = AccountError::from(err);
    match &mapped {
        AccountError::AlreadyExists(field) => {
            debug!(operation, %field, "Unique constraint violation");
        }
        other => error!(operation, error = %other, "User store query failed"),
    }
    mapped
}

/// Builds an `ILIKE` pattern matching `query` as a literal substring.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &NewUser) -> AccountResult<User> {
        debug!("Creating user: {}", user.username);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.full_name.as_deref())
        .bind(user.bio.as_deref())
        .fetch_one(self.pool.inner())
        .await
        .map_err(|e| store_error("create", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: UserId) -> AccountResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await
        .map_err(|e| store_error("find_by_id", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AccountResult<Option<User>> {
        debug!("Finding user by username: {}", username);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool.inner())
        .await
        .map_err(|e| store_error("find_by_username", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool.inner())
        .await
        .map_err(|e| store_error("find_by_email", e))?;

        Ok(row.map(User::from))
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> AccountResult<User> {
        debug!("Updating user: {}", id);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                username   = COALESCE($2, username),
                email      = COALESCE($3, email),
                full_name  = COALESCE($4, full_name),
                bio        = COALESCE($5, bio),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.full_name.as_deref())
        .bind(changes.bio.as_deref())
        .fetch_optional(self.pool.inner())
        .await
        .map_err(|e| store_error("update", e))?;

        row.map(User::from)
            .ok_or_else(|| AccountError::not_found("User", id))
    }

    async fn delete(&self, id: UserId) -> AccountResult<bool> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await
            .map_err(|e| store_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, query: &str, page: PageRequest) -> AccountResult<Page<User>> {
        debug!(
            "Searching users: query={}, page={}, limit={}",
            query, page.page, page.limit
        );

        let pattern = like_pattern(query);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE username ILIKE $1 OR email ILIKE $1 OR full_name ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(self.pool.inner())
        .await
        .map_err(|e| store_error("search", e))?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE username ILIKE $1 OR email ILIKE $1 OR full_name ILIKE $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(i64::from(page.limit()))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(self.pool.inner())
        .await
        .map_err(|e| store_error("search", e))?;

        let users = rows.into_iter().map(User::from).collect();
        Ok(Page::new(users, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> AccountResult<bool> {
        debug!("Updating password for user: {}", id);

        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(self.pool.inner())
                .await
                .map_err(|e| store_error("update_password", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_avatar(&self, id: UserId, avatar_url: &str) -> AccountResult<bool> {
        debug!("Updating avatar for user: {}", id);

        let result =
            sqlx::query("UPDATE users SET avatar_url = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(avatar_url)
                .execute(self.pool.inner())
                .await
                .map_err(|e| store_error("update_avatar", e))?;

        Ok(result.rows_affected() > 0)
    }
}
