//! In-memory integration tests for task lifecycle operations.

use super::helpers::{Engine, engine, user};
use ipforge::ErrorKind;
use ipforge::identity::domain::{IdentityContext, UserId};
use ipforge::page::PageRequest;
use ipforge::task::{domain::GenerationStatus, services::CreateTaskRequest};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worker_drives_owned_task_to_completion(engine: Engine) -> eyre::Result<()> {
    let u1 = user("u1")?;
    let worker = IdentityContext::service();
    let created = engine
        .tasks
        .create(
            &u1,
            CreateTaskRequest::new("text_to_image", "a fox")
                .owned_by("u1")
                .with_input_image("u1/sketch.png"),
        )
        .await?;

    engine.tasks.start_processing(&worker, created.id()).await?;
    engine
        .tasks
        .complete(
            &worker,
            created.id(),
            Some("u1/fox.png"),
            Some(json!({"model": "sdxl", "steps": 30})),
        )
        .await?;

    let seen = engine.tasks.get(&u1, created.id()).await?;
    eyre::ensure!(seen.status() == GenerationStatus::Completed);
    eyre::ensure!(seen.result_data() == Some(&json!({"model": "sdxl", "steps": 30})));
    eyre::ensure!(seen.updated_at() >= seen.created_at());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reads_of_foreign_tasks_look_like_missing_ones(engine: Engine) -> eyre::Result<()> {
    let created = engine
        .tasks
        .create(
            &user("u1")?,
            CreateTaskRequest::new("text_to_image", "a fox").owned_by("u1"),
        )
        .await?;

    let foreign = engine.tasks.get(&user("u2")?, created.id()).await;
    let missing = engine
        .tasks
        .get(&user("u2")?, ipforge::task::domain::TaskId::new())
        .await;

    let (Err(foreign_err), Err(missing_err)) = (foreign, missing) else {
        eyre::bail!("both reads must fail");
    };
    eyre::ensure!(foreign_err.kind() == ErrorKind::NotFound);
    eyre::ensure!(missing_err.kind() == ErrorKind::NotFound);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn anonymous_tasks_list_under_no_owner(engine: Engine) -> eyre::Result<()> {
    let guest = IdentityContext::anonymous();
    engine
        .tasks
        .create(&guest, CreateTaskRequest::new("text_to_image", "a hare"))
        .await?;
    engine
        .tasks
        .create(
            &user("u1")?,
            CreateTaskRequest::new("text_to_image", "a fox").owned_by("u1"),
        )
        .await?;

    let anonymous = engine
        .tasks
        .list_by_owner(&user("u7")?, None, PageRequest::first(10))
        .await?;
    eyre::ensure!(anonymous.len() == 1);

    let owner = UserId::new("u1")?;
    let all_u1 = engine
        .tasks
        .list_by_owner(&IdentityContext::service(), Some(&owner), PageRequest::first(10))
        .await?;
    eyre::ensure!(all_u1.len() == 1);
    Ok(())
}
