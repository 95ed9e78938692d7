//! Unit tests for asset storage authorization.

use crate::access::{
    AccessDenied, AssetBucket, AssetPath, BucketVisibility, Decision, EntityType, Operation,
    StorageAccessPolicy,
};
use crate::error::ErrorKind;
use crate::identity::domain::{IdentityContext, UserId};
use rstest::rstest;

fn user(id: &str) -> Result<IdentityContext, eyre::Report> {
    Ok(IdentityContext::user(UserId::new(id)?))
}

#[rstest]
#[case("u1", Operation::Update, Decision::Allow)]
#[case("u1", Operation::Delete, Decision::Allow)]
#[case("u2", Operation::Update, Decision::Deny)]
#[case("u2", Operation::Delete, Decision::Deny)]
#[case("u2", Operation::Read, Decision::Allow)]
#[case("u2", Operation::Insert, Decision::Allow)]
fn owner_folder_governs_updates(
    #[case] caller: &str,
    #[case] operation: Operation,
    #[case] expected: Decision,
) -> Result<(), eyre::Report> {
    let path = AssetPath::parse("u1/avatar.png")?;
    let decision = StorageAccessPolicy::authorize_asset(
        &user(caller)?,
        operation,
        &path,
        BucketVisibility::Public,
    );
    assert_eq!(decision, expected);
    Ok(())
}

#[rstest]
fn public_bucket_is_readable_without_identity() -> Result<(), eyre::Report> {
    let path = AssetPath::parse("u1/avatar.png")?;
    let policy = StorageAccessPolicy::default();
    assert_eq!(
        policy.authorize(&IdentityContext::anonymous(), Operation::Read, &path),
        Decision::Allow
    );
    Ok(())
}

#[rstest]
fn insert_requires_authentication_only() -> Result<(), eyre::Report> {
    // Uploading into someone else's folder is allowed; ownership is a path
    // convention and only constrains later updates.
    let path = AssetPath::parse("u1/avatar.png")?;
    let policy = StorageAccessPolicy::default();
    assert_eq!(
        policy.authorize(&user("u9")?, Operation::Insert, &path),
        Decision::Allow
    );
    assert_eq!(
        policy.authorize(&IdentityContext::anonymous(), Operation::Insert, &path),
        Decision::Deny
    );
    assert_eq!(
        policy.authorize(&user("u9")?, Operation::Update, &path),
        Decision::Deny
    );
    Ok(())
}

#[rstest]
#[case(Operation::Read, Decision::Allow)]
#[case(Operation::Insert, Decision::Allow)]
#[case(Operation::Update, Decision::Deny)]
#[case(Operation::Delete, Decision::Deny)]
fn service_role_uploads_but_cannot_overwrite(
    #[case] operation: Operation,
    #[case] expected: Decision,
) -> Result<(), eyre::Report> {
    let path = AssetPath::parse("u1/result.png")?;
    let policy = StorageAccessPolicy::default();
    assert_eq!(
        policy.authorize(&IdentityContext::service(), operation, &path),
        expected
    );
    Ok(())
}

#[rstest]
fn root_level_objects_have_no_owner() -> Result<(), eyre::Report> {
    let path = AssetPath::parse("u1")?;
    let policy = StorageAccessPolicy::default();
    assert_eq!(
        policy.authorize(&user("u1")?, Operation::Delete, &path),
        Decision::Deny
    );
    Ok(())
}

#[rstest]
#[case("u1", Decision::Allow)]
#[case("u2", Decision::Deny)]
fn private_bucket_reads_follow_owner_folder(
    #[case] caller: &str,
    #[case] expected: Decision,
) -> Result<(), eyre::Report> {
    let path = AssetPath::parse("u1/secret.png")?;
    let policy = StorageAccessPolicy::new(AssetBucket::new("drafts", BucketVisibility::Private)?);
    assert_eq!(policy.authorize(&user(caller)?, Operation::Read, &path), expected);
    Ok(())
}

#[rstest]
fn require_maps_denial_to_asset_error() -> Result<(), eyre::Report> {
    let path = AssetPath::parse("u1/avatar.png")?;
    let result = StorageAccessPolicy::default().require(&user("u2")?, Operation::Delete, &path);
    assert_eq!(
        result,
        Err(AccessDenied {
            operation: Operation::Delete,
            entity: EntityType::Asset,
        })
    );
    assert!(
        result
            .err()
            .is_some_and(|denied| denied.kind() == ErrorKind::Unauthorized)
    );
    Ok(())
}
