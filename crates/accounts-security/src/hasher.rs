//! Password hashing using Argon2.

use accounts_core::{AccountError, AccountResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
use tracing::debug;

/// Interface for password hashing operations.
pub trait PasswordHasherInterface: Send + Sync {
    /// Hashes a password into a PHC string.
    fn hash(&self, password: &str) -> AccountResult<String>;

    /// Verifies a password against a PHC string.
    ///
    /// A wrong password is `Ok(false)`; a malformed hash is an error.
    fn verify(&self, password: &str, hash: &str) -> AccountResult<bool>;

    /// Checks if a hash was produced with a different algorithm.
    fn needs_rehash(&self, hash: &str) -> bool;
}

/// Password hasher service using Argon2id.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
}

impl PasswordHasher {
    /// Creates a new password hasher with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    /// Creates a new password hasher with custom parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Self {
            argon2: Arc::new(argon2),
        }
    }

    /// Creates a password hasher from a cost parameter (Argon2 iterations).
    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            cost.max(1),
            Params::DEFAULT_P_COST,
            None,
        )
        .unwrap_or(Params::DEFAULT);

        Self::with_params(params)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherInterface for PasswordHasher {
    fn hash(&self, password: &str) -> AccountResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AccountError::Internal(format!("Failed to hash password: {}", e)))?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> AccountResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AccountError::Internal(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(AccountError::Internal(format!(
                "Password verification error: {}",
                e
            ))),
        }
    }

    fn needs_rehash(&self, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map_or(true, |parsed| parsed.algorithm != Algorithm::Argon2id.ident())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(1)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "MySecurePassword123!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash).unwrap());
        assert!(!hasher.verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_different_salts() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("TestPassword123!").unwrap();
        let hash2 = hasher.hash("TestPassword123!").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("TestPassword123!", &hash1).unwrap());
        assert!(hasher.verify("TestPassword123!", &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format_returns_error() {
        let result = fast_hasher().verify("password", "not-a-valid-hash");
        assert!(matches!(result, Err(AccountError::Internal(_))));
    }

    #[test]
    fn test_needs_rehash() {
        let hasher = fast_hasher();
        let hash = hasher.hash("password").unwrap();
        assert!(!hasher.needs_rehash(&hash));
        assert!(hasher.needs_rehash("garbage-hash"));
    }

    #[test]
    fn test_hasher_debug_does_not_leak_internals() {
        let debug_str = format!("{:?}", fast_hasher());
        assert_eq!(debug_str, "PasswordHasher { .. }");
    }
}
