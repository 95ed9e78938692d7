//! In-memory character adapters.

mod character;

pub use character::InMemoryCharacterRepository;
