//! Use cases over the user store.
//!
//! Handlers talk to `UserService`; the service talks to `UserRepository`.

mod user_service;

pub use user_service::{UserManager, UserService};
