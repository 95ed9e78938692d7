//! Engine configuration loaded with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. An optional TOML file
//! 3. `IPFORGE_*` environment variables, with `__` separating nested keys
//!    (for example `IPFORGE_ASSET_BUCKET__NAME`)

use crate::access::AssetBucket;
use crate::page::PageLimits;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "IPFORGE_";

/// Runtime settings shared by the services.
///
/// # Examples
///
/// ```
/// use ipforge::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.asset_bucket.name, "generated-images");
/// assert!(config.max_page_size >= config.default_page_size);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deadline the database enforces on every repository call, in
    /// milliseconds. Services abandon a call that has not answered after
    /// twice this long (see [`EngineConfig::storage_backstop`]).
    pub storage_timeout_ms: u64,
    /// Page size used when a caller does not pick one.
    pub default_page_size: usize,
    /// Largest page size a caller may request.
    pub max_page_size: usize,
    /// Bucket holding generated assets.
    pub asset_bucket: AssetBucket,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let pages = PageLimits::default();
        Self {
            storage_timeout_ms: 5_000,
            default_page_size: pages.default_size,
            max_page_size: pages.max_size,
            asset_bucket: AssetBucket::generated_images(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed or a value had the wrong type.
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    /// The merged values are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl EngineConfig {
    /// Short timeouts and small pages, for constrained deployments.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            storage_timeout_ms: 1_000,
            default_page_size: 10,
            max_page_size: 25,
            ..Self::default()
        }
    }

    /// Returns the storage timeout as a [`Duration`].
    #[must_use]
    pub const fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    /// Returns how long a service waits for a repository call before giving
    /// up on it.
    ///
    /// This is twice the database deadline so that a `PostgreSQL` call has
    /// either committed or been cancelled by the server before the service
    /// stops waiting; the in-memory adapters only ever hit this limit when
    /// they stall.
    #[must_use]
    pub const fn storage_backstop(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms.saturating_mul(2))
    }

    /// Returns the page limits.
    #[must_use]
    pub const fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.default_page_size,
            max_size: self.max_page_size,
        }
    }

    /// Loads defaults overridden by `IPFORGE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::base().merge(env_provider()))
    }

    /// Loads defaults, then `path`, then environment overrides.
    ///
    /// A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction or validation fails.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::extract(Self::base().merge(Toml::file(path)).merge(env_provider()))
    }

    /// Loads defaults overridden by TOML text only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction or validation fails.
    pub fn load_from_str(toml_content: &str) -> Result<Self, ConfigError> {
        Self::extract(Self::base().merge(Toml::string(toml_content)))
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage_timeout_ms must be positive".to_owned(),
            ));
        }
        if self.default_page_size == 0 || self.max_page_size < self.default_page_size {
            return Err(ConfigError::Invalid(format!(
                "page sizes must satisfy 0 < default ({}) <= max ({})",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.asset_bucket.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "asset_bucket.name must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(Self::default()))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}
