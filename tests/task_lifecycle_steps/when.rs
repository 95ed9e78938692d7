//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async, user};
use ipforge::identity::domain::IdentityContext;
use rstest_bdd_macros::when;

#[when(r#"user "{caller}" starts processing the task again"#)]
fn user_restarts_task(world: &mut TaskLifecycleWorld, caller: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.service.start_processing(&user(&caller)?, task_id));
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"user "{caller}" reads the task"#)]
fn user_reads_task(world: &mut TaskLifecycleWorld, caller: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.service.get(&user(&caller)?, task_id));
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"the service role looks up batch "{batch}""#)]
fn service_looks_up_batch(world: &mut TaskLifecycleWorld, batch: String) -> Result<(), eyre::Report> {
    let found = run_async(
        world
            .service
            .find_by_batch(&IdentityContext::service(), &batch),
    )?;
    world.batch_result = Some(found);
    Ok(())
}
