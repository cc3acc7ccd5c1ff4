use tracing::info;

use super::SubmissionService;
use crate::errors::{GroupworkError, Result};
use crate::models::submissions::entities::{SubmitOutcome, SubmitResult};
use crate::services::assignments::AssignmentLifecycle;
use crate::services::retry::with_tx_retry;

/// 创建或覆盖小组回答
///
/// 小组查找、状态检查与写入在同一事务内完成。两名成员同时首次提交时，
/// 落败的一方在新事务中重新执行，此时会走更新分支。
pub async fn submit_response(
    service: &SubmissionService,
    student_id: i64,
    assignment_id: i64,
    content: &str,
) -> Result<SubmitResult> {
    if content.trim().is_empty() {
        return Err(GroupworkError::validation("response text must not be blank"));
    }

    with_tx_retry("submit_response", move || {
        submit_once(service, student_id, assignment_id, content)
    })
    .await
}

async fn submit_once(
    service: &SubmissionService,
    student_id: i64,
    assignment_id: i64,
    content: &str,
) -> Result<SubmitResult> {
    let tx = service.storage.begin().await?;

    let group = tx
        .get_student_group(student_id, assignment_id)
        .await?
        .ok_or_else(|| {
            GroupworkError::forbidden(format!(
                "student {student_id} is not in a group for assignment {assignment_id}"
            ))
        })?;

    let assignment = tx.get_assignment_by_id(assignment_id).await?.ok_or_else(|| {
        GroupworkError::not_found(format!("assignment {assignment_id} does not exist"))
    })?;
    AssignmentLifecycle::ensure_can_submit_response(&assignment)?;

    if let Some(existing) = tx.get_submission_by_group(group.id).await? {
        let submission = tx.update_submission(existing.id, content).await?;
        tx.commit().await?;
        info!(
            "Response of group {} for assignment {} updated by student {}",
            group.id, assignment_id, student_id
        );
        return Ok(SubmitResult {
            outcome: SubmitOutcome::Updated,
            submission,
        });
    }

    // 唯一索引冲突说明另一名成员刚刚提交，回滚后重新执行即走更新分支
    let submission = tx
        .try_insert_submission(group.id, content)
        .await?
        .ok_or_else(|| {
            GroupworkError::transaction_conflict(format!(
                "group {} already has a response",
                group.id
            ))
        })?;
    tx.commit().await?;

    info!(
        "Response of group {} for assignment {} created by student {}",
        group.id, assignment_id, student_id
    );

    Ok(SubmitResult {
        outcome: SubmitOutcome::Created,
        submission,
    })
}
