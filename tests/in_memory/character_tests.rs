//! In-memory integration tests for characters derived from tasks.

use super::helpers::{Engine, engine, user};
use ipforge::ErrorKind;
use ipforge::access::AssetRef;
use ipforge::character::{domain::CharacterPatch, services::CreateCharacterRequest};
use ipforge::page::PageRequest;
use ipforge::task::{domain::GenerationStatus, services::CreateTaskRequest};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_becomes_an_enriched_character(engine: Engine) -> eyre::Result<()> {
    let u1 = user("u1")?;
    let task = engine
        .tasks
        .create(
            &u1,
            CreateTaskRequest::new("text_to_image", "a fox").owned_by("u1"),
        )
        .await?;
    engine.tasks.start_processing(&u1, task.id()).await?;
    let done = engine
        .tasks
        .complete(&u1, task.id(), Some("u1/fox.png"), None)
        .await?;
    let image = done
        .result_image_ref()
        .ok_or_else(|| eyre::eyre!("completed task has no image"))?;

    let character = engine
        .characters
        .create(
            &u1,
            CreateCharacterRequest::new("Kitsune", image.as_str()).with_source_task(done.id()),
        )
        .await?;

    let follow_up = engine
        .tasks
        .create(
            &u1,
            CreateTaskRequest::new("multi_view", "left and back views")
                .owned_by("u1")
                .with_parent_character(character.id()),
        )
        .await?;
    eyre::ensure!(follow_up.parent_character_id() == Some(character.id()));

    engine
        .characters
        .update(
            &u1,
            character.id(),
            CharacterPatch::new()
                .with_left_view(AssetRef::new("u1/left.png")?)
                .with_back_view(AssetRef::new("u1/back.png")?)
                .with_merchandise_refs(json!({"sticker": "u1/sticker.png"})),
        )
        .await?;
    engine
        .characters
        .set_merchandise_status(&u1, character.id(), GenerationStatus::Completed)
        .await?;

    let listed = engine.characters.list_mine(&u1, PageRequest::first(5)).await?;
    let stored = listed
        .first()
        .ok_or_else(|| eyre::eyre!("character missing from listing"))?;
    eyre::ensure!(stored.source_task_id() == Some(done.id()));
    eyre::ensure!(stored.left_view_ref().is_some() && stored.back_view_ref().is_some());
    eyre::ensure!(stored.merchandise_status() == Some(GenerationStatus::Completed));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_main_image_is_rejected(engine: Engine) -> eyre::Result<()> {
    let result = engine
        .characters
        .create(&user("u1")?, CreateCharacterRequest::new("Kitsune", " "))
        .await;
    let Err(err) = result else {
        eyre::bail!("a character needs a main image");
    };
    eyre::ensure!(err.kind() == ErrorKind::Validation);
    Ok(())
}
