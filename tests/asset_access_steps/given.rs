//! Given steps for asset access BDD scenarios.

use super::world::AssetAccessWorld;
use ipforge::access::{AssetPath, BucketVisibility};
use rstest_bdd_macros::given;

#[given(r#"the asset "{path}" in the {visibility} bucket"#)]
fn asset_in_bucket(
    world: &mut AssetAccessWorld,
    path: String,
    visibility: String,
) -> Result<(), eyre::Report> {
    world.visibility = match visibility.as_str() {
        "public" => BucketVisibility::Public,
        "private" => BucketVisibility::Private,
        other => return Err(eyre::eyre!("unknown bucket visibility '{other}'")),
    };
    world.path = Some(AssetPath::parse(&path)?);
    Ok(())
}
