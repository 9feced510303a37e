//! # Accounts REST
//!
//! HTTP surface of the accounts service: user endpoints under `/api/v1/users`
//! plus liveness and readiness checks. Handlers are thin adapters over
//! [`accounts_service::UserService`]; they never see whether a cache sits in
//! front of the store.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;

#[cfg(test)]
pub(crate) mod testing;
