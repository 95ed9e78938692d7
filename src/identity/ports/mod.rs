//! Port contracts for identity lookup.

pub mod directory;

pub use directory::{IdentityDirectory, IdentityDirectoryError, IdentityDirectoryResult};
