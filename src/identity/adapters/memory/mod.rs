//! In-memory identity adapters.

mod directory;

pub use directory::InMemoryIdentityDirectory;
