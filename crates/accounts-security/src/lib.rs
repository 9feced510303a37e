//! # Accounts Security
//!
//! Argon2id password hashing behind a small trait so services can be tested
//! with a cheaper hasher.

mod hasher;

pub use hasher::*;
