//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async, user};
use eyre::WrapErr;
use ipforge::identity::domain::IdentityContext;
use ipforge::task::services::CreateTaskRequest;
use rstest_bdd_macros::given;

#[given(r#"user "{owner}" submits a task with prompt "{prompt}""#)]
fn user_submits_task(
    world: &mut TaskLifecycleWorld,
    owner: String,
    prompt: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new("text_to_image", prompt).owned_by(owner.as_str());
    let created = run_async(world.service.create(&user(&owner)?, request))
        .wrap_err("submit owned task")?;
    world.current_task = Some(created);
    Ok(())
}

#[given(r#"a guest submits a task with prompt "{prompt}""#)]
fn guest_submits_task(world: &mut TaskLifecycleWorld, prompt: String) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new("text_to_image", prompt);
    let created = run_async(world.service.create(&IdentityContext::anonymous(), request))
        .wrap_err("submit anonymous task")?;
    world.current_task = Some(created);
    Ok(())
}

#[given(r#"user "{caller}" starts processing the task"#)]
fn user_starts_processing(
    world: &mut TaskLifecycleWorld,
    caller: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let started = run_async(world.service.start_processing(&user(&caller)?, task_id))
        .wrap_err("start processing in scenario setup")?;
    world.current_task = Some(started);
    Ok(())
}

#[given(r#"user "{caller}" completes the task with image "{image}""#)]
fn user_completes_task(
    world: &mut TaskLifecycleWorld,
    caller: String,
    image: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let completed = run_async(world.service.complete(
        &user(&caller)?,
        task_id,
        Some(image.as_str()),
        None,
    ))
    .wrap_err("complete task in scenario setup")?;
    world.current_task = Some(completed);
    Ok(())
}

#[given(r#"a batch "{batch}" holding tasks owned by "{first}", "{second}" and nobody"#)]
fn mixed_owner_batch(
    world: &mut TaskLifecycleWorld,
    batch: String,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let requests = vec![
        CreateTaskRequest::new("text_to_image", "a fox").owned_by(first),
        CreateTaskRequest::new("text_to_image", "a hare").owned_by(second),
        CreateTaskRequest::new("text_to_image", "a badger"),
    ];
    run_async(
        world
            .service
            .create_batch(&IdentityContext::service(), &batch, requests),
    )
    .wrap_err("create mixed-owner batch")?;
    Ok(())
}
