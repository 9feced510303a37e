//! User entity.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account as held by the record store.
///
/// The full record, credential included, is what gets serialized into cache
/// entries, so every field round-trips through JSON. Transport layers map it
/// to a response type that leaves the credential out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,

    /// Unique username.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2 PHC hash of the password.
    pub password_hash: String,

    /// Display name.
    pub full_name: Option<String>,

    /// Free-form biography.
    pub bio: Option<String>,

    /// Profile picture URL.
    pub avatar_url: Option<String>,

    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns the display name (full name or username).
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }

    /// Applies a set of changes in place, advancing `updated_at`.
    pub fn apply(&mut self, changes: &UserChanges) {
        if let Some(username) = &changes.username {
            self.username.clone_from(username);
        }
        if let Some(email) = &changes.email {
            self.email.clone_from(email);
        }
        if let Some(full_name) = &changes.full_name {
            self.full_name = Some(full_name.clone());
        }
        if let Some(bio) = &changes.bio {
            self.bio = Some(bio.clone());
        }
        self.updated_at = Utc::now();
    }
}

/// Fields supplied when inserting a user; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

/// Partial update of a user's profile.
///
/// `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

impl UserChanges {
    /// Returns true if no column would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.full_name.is_none()
            && self.bio.is_none()
    }
}
