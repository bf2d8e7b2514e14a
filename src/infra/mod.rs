//! Persistence: connection, migrations and the user store.

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{UserRepository, UserStore, WriteOutcome};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
