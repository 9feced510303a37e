//! # Accounts Server Library
//!
//! Composition root of the accounts service: builds the record store, the
//! optional Redis cache and the service stack from configuration, and hosts
//! the logging and startup helpers used by the binary.

pub mod app;
pub mod startup;
