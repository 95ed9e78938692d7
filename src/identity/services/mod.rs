//! Application services for identity-scoped operations.

mod profile;
mod removal;

pub use profile::{ProfileViewError, ProfileViewService};
pub use removal::{AccountRemovalError, AccountRemovalService, RemovalSummary};
