//! Port contracts for character persistence.

pub mod repository;

pub use repository::{CharacterRepository, CharacterRepositoryError, CharacterRepositoryResult};
