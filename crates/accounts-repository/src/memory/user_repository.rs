//! In-memory user repository.

use crate::traits::UserRepository;
use accounts_core::{
    AccountError, AccountResult, NewUser, Page, PageRequest, UniqueField, User, UserChanges, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug)]
struct State {
    users: BTreeMap<UserId, User>,
    next_id: i64,
}

impl State {
    fn check_unique(
        &self,
        exclude: Option<UserId>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> AccountResult<()> {
        for user in self.users.values().filter(|u| Some(u.id) != exclude) {
            if username.is_some_and(|name| user.username == name) {
                return Err(AccountError::AlreadyExists(UniqueField::Username));
            }
            if email.is_some_and(|email| user.email == email) {
                return Err(AccountError::AlreadyExists(UniqueField::Email));
            }
        }
        Ok(())
    }
}

/// Process-local record store with the same uniqueness rules as Postgres.
///
/// Ids are assigned sequentially starting at 1 (or at the value passed to
/// [`InMemoryUserRepository::with_next_id`]).
#[derive(Debug)]
pub struct InMemoryUserRepository {
    state: Mutex<State>,
}

impl InMemoryUserRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_next_id(1)
    }

    /// Creates an empty store whose first assigned id is `next_id`.
    #[must_use]
    pub fn with_next_id(next_id: i64) -> Self {
        Self {
            state: Mutex::new(State {
                users: BTreeMap::new(),
                next_id,
            }),
        }
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().users.len()
    }

    /// Returns true if no user is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> AccountResult<User> {
        debug!("Creating user: {}", user.username);
        let mut state = self.state();
        state.check_unique(None, Some(&user.username), Some(&user.email))?;

        let id = UserId(state.next_id);
        state.next_id += 1;
        let now = Utc::now();
        let created = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            full_name: user.full_name.clone(),
            bio: user.bio.clone(),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> AccountResult<Option<User>> {
        Ok(self.state().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AccountResult<Option<User>> {
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> AccountResult<User> {
        debug!("Updating user: {}", id);
        let mut state = self.state();
        if !state.users.contains_key(&id) {
            return Err(AccountError::not_found("User", id));
        }
        state.check_unique(
            Some(id),
            changes.username.as_deref(),
            changes.email.as_deref(),
        )?;

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AccountError::not_found("User", id))?;
        user.apply(changes);
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> AccountResult<bool> {
        Ok(self.state().users.remove(&id).is_some())
    }

    async fn search(&self, query: &str, page: PageRequest) -> AccountResult<Page<User>> {
        let needle = query.to_lowercase();
        let matches = |user: &&User| {
            user.username.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
                || user
                    .full_name
                    .as_ref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
        };

        let state = self.state();
        let total = state.users.values().filter(matches).count() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let content = state
            .users
            .values()
            .filter(matches)
            .skip(offset)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, page, total))
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> AccountResult<bool> {
        Ok(self.state().users.get_mut(&id).map_or(false, |user| {
            password_hash.clone_into(&mut user.password_hash);
            user.updated_at = Utc::now();
            true
        }))
    }

    async fn update_avatar(&self, id: UserId, avatar_url: &str) -> AccountResult<bool> {
        Ok(self.state().users.get_mut(&id).map_or(false, |user| {
            user.avatar_url = Some(avatar_url.to_string());
            user.updated_at = Utc::now();
            true
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
            bio: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::with_next_id(7);
        let alice = repo.create(&new_user("alice", "a@x.com")).await.unwrap();
        let bob = repo.create(&new_user("bob", "b@x.com")).await.unwrap();

        assert_eq!(alice.id, UserId(7));
        assert_eq!(bob.id, UserId(8));
        assert_eq!(alice.created_at, alice.updated_at);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let repo = InMemoryUserRepository::new();
        repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        let err = repo.create(&new_user("alice", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists(UniqueField::Username)));

        let err = repo.create(&new_user("other", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists(UniqueField::Email)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_each_axis() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        assert_eq!(repo.find_by_id(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(repo.find_by_username("alice").await.unwrap(), Some(alice.clone()));
        assert_eq!(repo.find_by_email("a@x.com").await.unwrap(), Some(alice));
        assert!(repo.find_by_id(UserId(99)).await.unwrap().is_none());
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        let changes = UserChanges {
            email: Some("new@x.com".to_string()),
            bio: Some("hi".to_string()),
            ..UserChanges::default()
        };
        let updated = repo.update(alice.id, &changes).await.unwrap();

        assert_eq!(updated.username, "alice");
        assert_eq!(updated.email, "new@x.com");
        assert_eq!(updated.bio.as_deref(), Some("hi"));
        assert!(updated.updated_at >= alice.updated_at);
        assert!(repo.find_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_to_own_username_is_allowed() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        let changes = UserChanges {
            username: Some("alice".to_string()),
            ..UserChanges::default()
        };
        assert!(repo.update(alice.id, &changes).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_conflict_and_missing() {
        let repo = InMemoryUserRepository::new();
        repo.create(&new_user("alice", "a@x.com")).await.unwrap();
        let bob = repo.create(&new_user("bob", "b@x.com")).await.unwrap();

        let changes = UserChanges {
            username: Some("alice".to_string()),
            ..UserChanges::default()
        };
        let err = repo.update(bob.id, &changes).await.unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists(UniqueField::Username)));

        let err = repo.update(UserId(404), &UserChanges::default()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        assert!(repo.delete(alice.id).await.unwrap());
        assert!(!repo.delete(alice.id).await.unwrap());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_with_real_total() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            repo.create(&new_user(&format!("Alice{i}"), &format!("a{i}@x.com")))
                .await
                .unwrap();
        }
        let mut carol = new_user("carol", "c@x.com");
        carol.full_name = Some("Carol ALICEson".to_string());
        repo.create(&carol).await.unwrap();
        repo.create(&new_user("bob", "b@x.com")).await.unwrap();

        let page = repo.search("alice", PageRequest::new(1, 4)).await.unwrap();
        assert_eq!(page.len(), 4);
        assert_eq!(page.total_elements(), 6);

        let page = repo.search("alice", PageRequest::new(2, 4)).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.content[1].username, "carol");
    }

    #[tokio::test]
    async fn test_update_password_and_avatar() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        assert!(repo.update_password(alice.id, "new-hash").await.unwrap());
        assert!(repo.update_avatar(alice.id, "https://cdn/a.png").await.unwrap());
        assert!(!repo.update_avatar(UserId(404), "x").await.unwrap());

        let stored = repo.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");
        assert_eq!(stored.avatar_url.as_deref(), Some("https://cdn/a.png"));
    }
}
