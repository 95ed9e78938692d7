//! In-memory integration tests for account removal.

use super::helpers::{Engine, engine, user};
use ipforge::ErrorKind;
use ipforge::character::services::CreateCharacterRequest;
use ipforge::identity::domain::{IdentityContext, IdentityRecord, UserId};
use ipforge::identity::ports::IdentityDirectory;
use ipforge::page::PageRequest;
use ipforge::task::services::CreateTaskRequest;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_identity_cascades(engine: Engine) -> eyre::Result<()> {
    let u1_id = UserId::new("u1")?;
    let u1 = user("u1")?;
    engine
        .directory
        .upsert(
            &IdentityRecord::new(u1_id.clone(), chrono::Utc::now())
                .with_metadata(json!({"username": "kit"})),
        )
        .await?;
    let profile = engine.profiles.get(&u1, &u1_id).await?;
    eyre::ensure!(profile.username.as_deref() == Some("kit"));

    let task = engine
        .tasks
        .create(
            &u1,
            CreateTaskRequest::new("text_to_image", "a fox").owned_by("u1"),
        )
        .await?;
    let character = engine
        .characters
        .create(&u1, CreateCharacterRequest::new("Kitsune", "u1/fox.png"))
        .await?;
    let anonymous = engine
        .tasks
        .create(
            &IdentityContext::anonymous(),
            CreateTaskRequest::new("text_to_image", "a hare"),
        )
        .await?;

    let summary = engine.removal.remove(&u1, &u1_id).await?;
    eyre::ensure!(summary.tasks == 1);
    eyre::ensure!(summary.characters == 1);
    eyre::ensure!(summary.identity_removed);

    let worker = IdentityContext::service();
    let task_gone = engine.tasks.get(&worker, task.id()).await;
    eyre::ensure!(matches!(task_gone, Err(err) if err.kind() == ErrorKind::NotFound));
    let character_gone = engine.characters.get(&u1, character.id()).await;
    eyre::ensure!(matches!(character_gone, Err(err) if err.kind() == ErrorKind::NotFound));
    let profile_gone = engine.profiles.get(&u1, &u1_id).await;
    eyre::ensure!(matches!(profile_gone, Err(err) if err.kind() == ErrorKind::NotFound));

    engine.tasks.get(&worker, anonymous.id()).await?;
    let remaining = engine
        .tasks
        .list_by_owner(&worker, Some(&u1_id), PageRequest::first(10))
        .await?;
    eyre::ensure!(remaining.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removed_account_stays_empty(engine: Engine) -> eyre::Result<()> {
    let u1_id = UserId::new("u1")?;
    let u1 = user("u1")?;
    engine.removal.remove(&u1, &u1_id).await?;

    let task = engine
        .tasks
        .create(
            &u1,
            CreateTaskRequest::new("text_to_image", "a fox").owned_by("u1"),
        )
        .await;
    eyre::ensure!(matches!(task, Err(err) if err.kind() == ErrorKind::Unauthorized));
    let character = engine
        .characters
        .create(&u1, CreateCharacterRequest::new("Kitsune", "u1/fox.png"))
        .await;
    eyre::ensure!(matches!(character, Err(err) if err.kind() == ErrorKind::Unauthorized));

    let worker = IdentityContext::service();
    let orphans = engine
        .tasks
        .list_by_owner(&worker, Some(&u1_id), PageRequest::first(10))
        .await?;
    eyre::ensure!(orphans.is_empty());
    eyre::ensure!(engine.characters.list_mine(&u1, PageRequest::first(10)).await?.is_empty());
    Ok(())
}
