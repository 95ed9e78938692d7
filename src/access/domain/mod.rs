//! Vocabulary shared by the access rules.

mod asset;
mod error;
mod operation;

pub use asset::{AssetBucket, AssetPath, AssetRef, BucketVisibility};
pub use error::{AccessDenied, AccessDomainError};
pub use operation::{Decision, EntityType, Operation, ParseOperationError};
