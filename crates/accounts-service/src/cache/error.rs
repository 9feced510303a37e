//! Cache outcomes and failures.

use std::time::Duration;
use thiserror::Error;

/// Result type of cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Outcome of a cache read that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T = String> {
    /// The key held a value.
    Hit(T),
    /// The key did not exist (never set, expired or invalidated).
    Miss,
}

impl<T> CacheLookup<T> {
    /// Returns true on a hit.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Converts into an `Option`, dropping the distinction from errors.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss => None,
        }
    }

    /// Maps the hit value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CacheLookup<U> {
        match self {
            Self::Hit(value) => CacheLookup::Hit(f(value)),
            Self::Miss => CacheLookup::Miss,
        }
    }

    /// Maps the hit value with a fallible function.
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<CacheLookup<U>, E> {
        match self {
            Self::Hit(value) => f(value).map(CacheLookup::Hit),
            Self::Miss => Ok(CacheLookup::Miss),
        }
    }
}

/// Infrastructure failure of the cache. Never a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No connection could be obtained.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// The call did not finish within its deadline.
    #[error("cache call timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected or failed a command.
    #[error("cache command failed: {0}")]
    Command(String),

    /// A stored entry could not be encoded or decoded.
    #[error("cache entry serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Some keys of a multi-key write or delete failed.
    #[error("cache operation failed for {keys:?}: {reason}")]
    Partial { keys: Vec<String>, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_helpers() {
        let hit: CacheLookup<u8> = CacheLookup::Hit(2);
        assert!(hit.is_hit());
        assert_eq!(hit.clone().map(|v| v * 2), CacheLookup::Hit(4));
        assert_eq!(hit.into_option(), Some(2));

        let miss: CacheLookup<u8> = CacheLookup::Miss;
        assert!(!miss.is_hit());
        assert_eq!(miss.try_map(|v| Ok::<_, ()>(v + 1)), Ok(CacheLookup::Miss));
    }

    #[test]
    fn test_error_display() {
        let err = CacheError::Partial {
            keys: vec!["user:7".to_string()],
            reason: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cache operation failed for [\"user:7\"]: connection reset"
        );
        assert!(CacheError::Timeout(Duration::from_millis(250))
            .to_string()
            .contains("250ms"));
    }
}
