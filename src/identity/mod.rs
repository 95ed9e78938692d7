//! Caller identities and the records derived from them.
//!
//! The external authentication collaborator supplies an [`IdentityContext`]
//! for every request. This module also owns the read-only profile projection
//! and the account removal flow that cascades to tasks and characters.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//!
//! [`IdentityContext`]: domain::IdentityContext

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
