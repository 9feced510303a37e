//! Domain entities for the accounts service.

pub mod user;

pub use user::*;
