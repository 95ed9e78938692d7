//! Integration tests for the storage access policy.

use super::helpers::user;
use ipforge::access::{
    AssetBucket, AssetPath, BucketVisibility, Operation, StorageAccessPolicy,
};
use ipforge::config::EngineConfig;
use ipforge::identity::domain::{IdentityContext, UserId};
use rstest::rstest;

#[rstest]
fn configured_bucket_drives_read_visibility() -> eyre::Result<()> {
    let config = EngineConfig::load_from_str(
        "[asset_bucket]\nname = \"drafts\"\nvisibility = \"private\"\n",
    )?;
    let policy = StorageAccessPolicy::new(config.asset_bucket);
    let path = AssetPath::parse("u1/draft.png")?;

    eyre::ensure!(policy.authorize(&user("u1")?, Operation::Read, &path).is_allowed());
    eyre::ensure!(!policy.authorize(&user("u2")?, Operation::Read, &path).is_allowed());
    eyre::ensure!(
        !policy
            .authorize(&IdentityContext::anonymous(), Operation::Read, &path)
            .is_allowed()
    );
    Ok(())
}

#[rstest]
fn uploads_land_in_the_owner_folder() -> eyre::Result<()> {
    let owner = UserId::new("u1")?;
    let path = AssetPath::for_owner(&owner, "fox.png")?;
    let policy = StorageAccessPolicy::new(AssetBucket::new(
        "generated-images",
        BucketVisibility::Public,
    )?);

    eyre::ensure!(path.as_str() == "u1/fox.png");
    eyre::ensure!(
        policy
            .authorize(&IdentityContext::user(owner), Operation::Delete, &path)
            .is_allowed()
    );
    Ok(())
}
