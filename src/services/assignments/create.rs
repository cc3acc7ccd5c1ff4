use std::sync::Arc;

use tracing::info;

use super::AssignmentService;
use super::lifecycle::AssignmentLifecycle;
use crate::errors::{GroupworkError, Result};
use crate::models::{
    assignments::{
        entities::{Assignment, Group, NewAssignment},
        requests::CreateAssignmentRequest,
        responses::CreatedAssignmentResponse,
    },
    users::entities::StudentSummary,
};
use crate::services::groups::checker;
use crate::services::retry::with_tx_retry;
use crate::storage::Storage;

/// 约束检查与写入在同一事务内；冲突重试时在新快照上重新检查配对上限
async fn insert_once(
    storage: &Arc<dyn Storage>,
    new: &NewAssignment,
    student_ids: &[i64],
) -> Result<(Assignment, Group)> {
    let tx = storage.begin().await?;
    let created = AssignmentLifecycle::create(tx.as_ref(), new.clone(), student_ids).await?;
    tx.commit().await?;
    Ok(created)
}

pub async fn create_assignment(
    service: &AssignmentService,
    teacher_id: i64,
    req: CreateAssignmentRequest,
) -> Result<CreatedAssignmentResponse> {
    let storage = &service.storage;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(GroupworkError::validation("assignment title must not be blank"));
    }

    checker::validate_group_shape(&req.student_ids)?;

    // 所有成员必须是已存在的学生
    let students = storage.get_users_by_ids(&req.student_ids).await?;
    let unknown: Vec<i64> = req
        .student_ids
        .iter()
        .copied()
        .filter(|id| !students.iter().any(|s| s.id == *id && s.is_student()))
        .collect();
    if !unknown.is_empty() {
        return Err(GroupworkError::validation(format!(
            "unknown student ids: {unknown:?}"
        )));
    }

    let new = NewAssignment {
        title: title.to_string(),
        description: req.description.clone(),
        teacher_id,
    };
    let (new, student_ids) = (&new, req.student_ids.as_slice());
    let (assignment, group) = with_tx_retry("create_assignment", move || {
        insert_once(storage, new, student_ids)
    })
    .await?;

    info!(
        "Assignment {} created by teacher {} for group {} ({} students)",
        assignment.id,
        teacher_id,
        group.id,
        students.len()
    );

    Ok(CreatedAssignmentResponse {
        assignment,
        group_id: group.id,
        members: students.into_iter().map(StudentSummary::from).collect(),
    })
}
