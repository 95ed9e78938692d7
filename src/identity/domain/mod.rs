//! Domain model for caller identities and profile projections.

mod context;
mod error;
mod ids;
mod profile;

pub use context::{IdentityContext, Role};
pub use error::IdentityDomainError;
pub use ids::UserId;
pub use profile::{IdentityRecord, ProfileView};
