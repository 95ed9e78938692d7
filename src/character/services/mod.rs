//! Application services for the character registry.

mod registry;

pub use registry::{
    CharacterRegistryError, CharacterRegistryResult, CharacterRegistryService,
    CreateCharacterRequest,
};
