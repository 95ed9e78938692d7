//! Unit tests for task submission, payloads and timestamp stamping.

use crate::access::AssetRef;
use crate::error::ErrorKind;
use crate::identity::domain::UserId;
use crate::task::domain::{
    BatchId, GenerationStatus, GenerationTask, MAX_TASK_TYPE_CHARS, TaskDomainError,
    TaskSubmission, TaskTransition,
};
use crate::task::services::TimestampMaintainer;
use crate::test_support::SteppingClock;
use chrono::Duration;
use eyre::ensure;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;

#[fixture]
fn clock() -> Arc<SteppingClock> {
    Arc::new(SteppingClock::starting_at(1_700_000_000))
}

#[rstest]
#[case("", "a fox", TaskDomainError::EmptyTaskType)]
#[case("text_to_image", "   ", TaskDomainError::EmptyPrompt)]
fn submission_rejects_blank_fields(
    #[case] task_type: &str,
    #[case] prompt: &str,
    #[case] expected: TaskDomainError,
) {
    let result = TaskSubmission::new(None, task_type, prompt);
    assert_eq!(result, Err(expected));
}

#[rstest]
#[case(MAX_TASK_TYPE_CHARS, true)]
#[case(MAX_TASK_TYPE_CHARS + 1, false)]
fn task_type_fits_its_column(#[case] length: usize, #[case] accepted: bool) {
    let task_type = "\u{e9}".repeat(length);
    match TaskSubmission::new(None, task_type, "a fox") {
        Ok(_) => assert!(accepted),
        Err(err) => {
            assert!(!accepted);
            assert_eq!(
                err,
                TaskDomainError::TaskTypeTooLong {
                    max: MAX_TASK_TYPE_CHARS,
                    actual: length,
                }
            );
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }
}

#[rstest]
fn blank_batch_id_is_rejected() {
    assert_eq!(BatchId::new("  "), Err(TaskDomainError::EmptyBatchId));
}

#[rstest]
fn blank_failure_message_is_rejected() {
    let result = TaskTransition::fail("");
    assert_eq!(result, Err(TaskDomainError::EmptyErrorMessage));
    assert_eq!(TaskDomainError::EmptyErrorMessage.kind(), ErrorKind::Validation);
}

#[rstest]
fn submitted_task_starts_pending_with_equal_timestamps(
    clock: Arc<SteppingClock>,
) -> eyre::Result<()> {
    let owner = UserId::new("u1")?;
    let submission = TaskSubmission::new(Some(owner.clone()), "text_to_image", " a fox ")?
        .with_batch(BatchId::new("b1")?)
        .with_input_image(AssetRef::new("u1/input.png")?);
    let task = GenerationTask::submit(submission, &*clock);

    ensure!(task.status() == GenerationStatus::Pending);
    ensure!(task.owner_id() == Some(&owner));
    ensure!(task.prompt() == "a fox");
    ensure!(task.batch_id().map(BatchId::as_str) == Some("b1"));
    ensure!(task.created_at() == task.updated_at());
    ensure!(task.result_image_ref().is_none());
    ensure!(task.error_message().is_none());
    Ok(())
}

#[rstest]
fn completion_records_result_payload(clock: Arc<SteppingClock>) -> eyre::Result<()> {
    let submission = TaskSubmission::new(None, "text_to_image", "a fox")?;
    let mut task = GenerationTask::submit(submission, &*clock);
    task.apply(TaskTransition::StartProcessing)?;
    task.apply(TaskTransition::complete(
        Some(AssetRef::new("u1/fox.png")?),
        Some(json!({"seed": 42, "variants": [{"w": 512}]})),
    ))?;

    ensure!(task.result_image_ref().map(AssetRef::as_str) == Some("u1/fox.png"));
    ensure!(task.result_data() == Some(&json!({"seed": 42, "variants": [{"w": 512}]})));
    ensure!(task.error_message().is_none());
    Ok(())
}

#[rstest]
fn failure_records_message_only(clock: Arc<SteppingClock>) -> eyre::Result<()> {
    let submission = TaskSubmission::new(None, "text_to_image", "a fox")?;
    let mut task = GenerationTask::submit(submission, &*clock);
    task.apply(TaskTransition::StartProcessing)?;
    task.apply(TaskTransition::fail("model overloaded")?)?;

    ensure!(task.status() == GenerationStatus::Failed);
    ensure!(task.error_message() == Some("model overloaded"));
    ensure!(task.result_image_ref().is_none());
    ensure!(task.result_data().is_none());
    Ok(())
}

#[rstest]
fn stamp_advances_updated_at_only(clock: Arc<SteppingClock>) -> eyre::Result<()> {
    let submission = TaskSubmission::new(None, "text_to_image", "a fox")?;
    let mut task = GenerationTask::submit(submission, &*clock);
    let created = task.created_at();
    let maintainer = TimestampMaintainer::new(Arc::clone(&clock));

    maintainer.stamp(&mut task);

    ensure!(task.created_at() == created);
    ensure!(task.updated_at() > created);
    Ok(())
}

#[rstest]
fn stamp_never_moves_backwards(clock: Arc<SteppingClock>) -> eyre::Result<()> {
    let submission = TaskSubmission::new(None, "text_to_image", "a fox")?;
    let mut task = GenerationTask::submit(submission, &*clock);
    let maintainer = TimestampMaintainer::new(Arc::clone(&clock));
    maintainer.stamp(&mut task);
    let stamped = task.updated_at();

    clock.rewind(Duration::hours(1));
    maintainer.stamp(&mut task);

    ensure!(task.updated_at() == stamped);
    Ok(())
}

#[rstest]
fn invalid_owner_maps_to_validation() {
    let result = UserId::new("").map_err(TaskDomainError::from);
    assert!(matches!(result, Err(TaskDomainError::InvalidOwner(_))));
    if let Err(err) = result {
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
