//! Then steps for asset access BDD scenarios.

use super::world::{AssetAccessWorld, operation};
use ipforge::access::StorageAccessPolicy;
use ipforge::identity::domain::{IdentityContext, UserId};
use rstest_bdd_macros::then;

fn decide(
    world: &AssetAccessWorld,
    identity: &IdentityContext,
    op: &str,
) -> Result<bool, eyre::Report> {
    let decision = StorageAccessPolicy::authorize_asset(
        identity,
        operation(op)?,
        world.path()?,
        world.visibility,
    );
    Ok(decision.is_allowed())
}

#[then(r#"user "{caller}" may "{op}" the asset"#)]
fn user_may(world: &AssetAccessWorld, caller: String, op: String) -> Result<(), eyre::Report> {
    let identity = IdentityContext::user(UserId::new(caller.as_str())?);
    eyre::ensure!(decide(world, &identity, &op)?, "{caller} should be allowed to {op}");
    Ok(())
}

#[then(r#"user "{caller}" may not "{op}" the asset"#)]
fn user_may_not(world: &AssetAccessWorld, caller: String, op: String) -> Result<(), eyre::Report> {
    let identity = IdentityContext::user(UserId::new(caller.as_str())?);
    eyre::ensure!(!decide(world, &identity, &op)?, "{caller} should be denied {op}");
    Ok(())
}

#[then(r#"a guest may "{op}" the asset"#)]
fn guest_may(world: &AssetAccessWorld, op: String) -> Result<(), eyre::Report> {
    eyre::ensure!(decide(world, &IdentityContext::anonymous(), &op)?);
    Ok(())
}

#[then(r#"a guest may not "{op}" the asset"#)]
fn guest_may_not(world: &AssetAccessWorld, op: String) -> Result<(), eyre::Report> {
    eyre::ensure!(!decide(world, &IdentityContext::anonymous(), &op)?);
    Ok(())
}
