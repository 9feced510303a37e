//! # Accounts Core
//!
//! Core types, traits, and error definitions for the accounts service.
//! Every other crate in the workspace builds on the error taxonomy,
//! the user entity, and the pagination types defined here.

pub mod domain;
pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
pub use validation::*;
