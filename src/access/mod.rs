//! Authorization rules for records and stored assets.
//!
//! Both entry points are pure functions of their inputs so the API layer can
//! evaluate them synchronously per request:
//!
//! - [`AccessControlEngine::authorize`] decides record-level access to
//!   generation tasks, characters and profiles.
//! - [`StorageAccessPolicy::authorize_asset`] decides access to objects in
//!   the asset bucket, keyed by an owner-prefixed path.
//!
//! A denial is a [`Decision`], not an error. Services turn it into record
//! absence for reads and into an `Unauthorized` failure for writes.

pub mod domain;
mod engine;
mod storage;

pub use domain::{
    AccessDenied, AccessDomainError, AssetBucket, AssetPath, AssetRef, BucketVisibility,
    Decision, EntityType, Operation, ParseOperationError,
};
pub use engine::{AccessControlEngine, OwnedRecord};
pub use storage::StorageAccessPolicy;

#[cfg(test)]
mod tests;
