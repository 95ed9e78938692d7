//! User-owned characters derived from completed generation tasks.
//!
//! Characters are created with a name and a main image, then enriched over
//! time with extra views, a 3D model and merchandise. Every operation is
//! scoped to the owning identity; there is no anonymous mode and no service
//! bypass.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
