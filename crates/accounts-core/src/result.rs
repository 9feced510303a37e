//! Result type aliases for the accounts service.

use crate::AccountError;

/// A specialized `Result` type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;
