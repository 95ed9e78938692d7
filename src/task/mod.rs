//! Generation task lifecycle tracking.
//!
//! Tasks are created in `pending`, move to `processing` when a worker picks
//! them up, and end in exactly one of `completed` or `failed`. Every
//! transition is authorized, validated against the state machine, stamped
//! with a fresh `updated_at`, and written with a compare-and-set on the
//! previous status so that concurrent requests from the same stale state
//! cannot both win.
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
