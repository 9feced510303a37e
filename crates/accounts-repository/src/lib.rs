//! # Accounts Repository
//!
//! Authoritative storage for user records.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn UserRepository>
//! PgUserRepository          (Postgres via SQLx)
//! InMemoryUserRepository    (tests, `memory://`)
//! ```

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryUserRepository;
pub use pool::*;
pub use postgres::PgUserRepository;
pub use traits::*;
