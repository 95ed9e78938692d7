//! Domain model for user-owned characters.

mod character;
mod error;
mod ids;

pub use character::{
    CharacterDraft, CharacterPatch, MAX_NAME_CHARS, PersistedCharacterData, UserIpCharacter,
};
pub use error::CharacterDomainError;
pub use ids::CharacterId;
