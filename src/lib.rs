//! Ipforge: authorization and lifecycle engine for image generation records.
//!
//! This crate tracks generation tasks through their state machine, keeps the
//! characters users derive from finished tasks, and decides who may read or
//! change each record and stored asset.
//!
//! # Architecture
//!
//! Ipforge follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (memory, `PostgreSQL`)
//! - **Services**: Orchestration that authorizes every call before storage
//!
//! # Modules
//!
//! - [`access`]: Record and asset authorization rules
//! - [`identity`]: Caller identities, profile projection and account removal
//! - [`task`]: Generation task lifecycle tracking
//! - [`character`]: User-owned characters and their enrichment
//! - [`config`]: Runtime settings loaded with Figment

pub mod access;
pub mod character;
pub mod config;
pub mod error;
pub mod identity;
pub mod page;
mod postgres;
pub mod task;
pub mod timeout;

pub use error::ErrorKind;

#[cfg(test)]
mod test_support;
