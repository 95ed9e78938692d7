//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use ipforge::identity::domain::IdentityContext;
use ipforge::task::domain::GenerationStatus;
use rstest_bdd_macros::then;

#[then(r#"the request fails with "{kind}""#)]
fn request_fails_with(world: &TaskLifecycleWorld, kind: String) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result"))?;
    match result {
        Err(err) if err.kind().as_str() == kind => Ok(()),
        other => Err(eyre::eyre!("expected {kind} failure, got {other:?}")),
    }
}

#[then(r#"the stored task status is "{status}""#)]
fn stored_status_is(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = GenerationStatus::try_from(status.as_str())?;
    let stored = run_async(
        world
            .service
            .get(&IdentityContext::service(), world.task()?.id()),
    )?;
    eyre::ensure!(
        stored.status() == expected,
        "expected status {expected}, found {}",
        stored.status()
    );
    Ok(())
}

#[then(r#"the stored task has result image "{image}""#)]
fn stored_result_image_is(world: &TaskLifecycleWorld, image: String) -> Result<(), eyre::Report> {
    let stored = run_async(
        world
            .service
            .get(&IdentityContext::service(), world.task()?.id()),
    )?;
    let actual = stored.result_image_ref().map(|asset| asset.as_str().to_owned());
    eyre::ensure!(actual.as_deref() == Some(image.as_str()));
    Ok(())
}

#[then("exactly {count:usize} tasks are returned")]
fn exactly_n_tasks(world: &TaskLifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let found = world
        .batch_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing batch result"))?;
    eyre::ensure!(found.len() == count, "expected {count}, found {}", found.len());
    Ok(())
}
