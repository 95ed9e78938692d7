//! Shared world state for asset access BDD scenarios.

use ipforge::access::{AssetPath, BucketVisibility, Operation};
use rstest::fixture;

/// Scenario world for asset access behaviour tests.
#[derive(Default)]
pub struct AssetAccessWorld {
    pub path: Option<AssetPath>,
    pub visibility: BucketVisibility,
}

impl AssetAccessWorld {
    /// Returns the asset path under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no asset has been chosen yet.
    pub fn path(&self) -> Result<&AssetPath, eyre::Report> {
        self.path
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing asset path in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AssetAccessWorld {
    AssetAccessWorld::default()
}

/// Parses an operation name used in feature files.
///
/// # Errors
///
/// Returns an error for unknown operation names.
pub fn operation(name: &str) -> Result<Operation, eyre::Report> {
    Ok(name.parse()?)
}
