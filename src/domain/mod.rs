//! The user record and the patch routine that edits it.

pub mod patch;
pub mod user;

pub use patch::{apply_patch, PatchDocument, PatchOperation, Patchable};
pub use user::{generate_api_key, NewUser, User};
