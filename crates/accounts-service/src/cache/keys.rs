//! Cache key derivation for user records.
//!
//! Keys are shared with other services reading the same Redis, so the format
//! is fixed and values are used verbatim (no case folding).

use accounts_core::{User, UserId};

/// Key of a user by ID.
#[must_use]
pub fn user_by_id(id: UserId) -> String {
    format!("user:{}", id)
}

/// Key of a user by email.
#[must_use]
pub fn user_by_email(email: &str) -> String {
    format!("user:email:{}", email)
}

/// Key of a user by username.
#[must_use]
pub fn user_by_username(username: &str) -> String {
    format!("user:username:{}", username)
}

/// All three keys of a record: id, email, username, in that order.
#[must_use]
pub fn user_keys(user: &User) -> [String; 3] {
    [
        user_by_id(user.id),
        user_by_email(&user.email),
        user_by_username(&user.username),
    ]
}
