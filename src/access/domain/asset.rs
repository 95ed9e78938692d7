//! Asset references, owner-prefixed object paths and bucket settings.

use super::AccessDomainError;
use crate::identity::domain::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a stored binary object (path or URL), never its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetRef(String);

impl AssetRef {
    /// Creates a validated asset reference.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDomainError::EmptyAssetRef`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, AccessDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccessDomainError::EmptyAssetRef);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reference as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetRef {
    type Error = AccessDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetRef> for String {
    fn from(value: AssetRef) -> Self {
        value.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object path inside a bucket.
///
/// The first folder of the path names the owning identity, so
/// `u1/avatars/me.png` belongs to `u1`. A bare file name such as `me.png`
/// sits outside every owner folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetPath {
    raw: String,
    segments: Vec<String>,
}

impl AssetPath {
    /// Parses an object path.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDomainError::EmptyAssetPath`] for blank input and
    /// [`AccessDomainError::InvalidAssetPath`] for absolute paths, empty
    /// segments, or `.`/`..` segments.
    pub fn parse(value: &str) -> Result<Self, AccessDomainError> {
        if value.trim().is_empty() {
            return Err(AccessDomainError::EmptyAssetPath);
        }
        let segments: Vec<String> = value.split('/').map(ToOwned::to_owned).collect();
        let malformed = segments
            .iter()
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
        if malformed {
            return Err(AccessDomainError::InvalidAssetPath(value.to_owned()));
        }
        Ok(Self {
            raw: value.to_owned(),
            segments,
        })
    }

    /// Builds `<owner>/<file_name>` for an upload by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDomainError::InvalidAssetPath`] if `file_name` is not
    /// a valid relative path.
    pub fn for_owner(owner: &UserId, file_name: &str) -> Result<Self, AccessDomainError> {
        Self::parse(&format!("{owner}/{file_name}"))
    }

    /// Returns the owner folder, or `None` for a path without folders.
    #[must_use]
    pub fn owner_segment(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [owner, _, ..] => Some(owner.as_str()),
            _ => None,
        }
    }

    /// Returns `true` when the owner folder equals `user`.
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_segment() == Some(user.as_str())
    }

    /// Returns the path as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Visibility of a bucket to unauthenticated readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketVisibility {
    /// Anyone holding the URL may read.
    #[default]
    Public,
    /// Only the owner folder's identity may read.
    Private,
}

/// Named asset namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetBucket {
    /// Bucket name.
    pub name: String,
    /// Read visibility.
    pub visibility: BucketVisibility,
}

impl AssetBucket {
    /// Name of the bucket holding generated artifacts.
    pub const GENERATED_IMAGES: &'static str = "generated-images";

    /// Creates a validated bucket description.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDomainError::EmptyBucketName`] for a blank name.
    pub fn new(
        name: impl Into<String>,
        visibility: BucketVisibility,
    ) -> Result<Self, AccessDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccessDomainError::EmptyBucketName);
        }
        Ok(Self {
            name: trimmed.to_owned(),
            visibility,
        })
    }

    /// Returns the public bucket for generated artifacts.
    #[must_use]
    pub fn generated_images() -> Self {
        Self {
            name: Self::GENERATED_IMAGES.to_owned(),
            visibility: BucketVisibility::Public,
        }
    }
}

impl Default for AssetBucket {
    fn default() -> Self {
        Self::generated_images()
    }
}
