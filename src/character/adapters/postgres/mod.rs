//! `PostgreSQL` adapters for character persistence.

mod models;
mod repository;
mod schema;

pub use repository::{CharacterPgPool, PostgresCharacterRepository};
