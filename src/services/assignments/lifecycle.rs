//! 任务生命周期：Open -> Closed，单向且只发生一次

use tracing::{info, warn};

use crate::errors::{GroupworkError, Result};
use crate::models::assignments::entities::{Assignment, Group, NewAssignment};
use crate::services::groups::checker;
use crate::storage::StorageTransaction;

pub struct AssignmentLifecycle;

impl AssignmentLifecycle {
    pub fn can_submit_response(assignment: &Assignment) -> bool {
        assignment.is_open()
    }

    pub fn can_grade(assignment: &Assignment) -> bool {
        assignment.is_open()
    }

    pub fn ensure_can_submit_response(assignment: &Assignment) -> Result<()> {
        if Self::can_submit_response(assignment) {
            Ok(())
        } else {
            Err(GroupworkError::invalid_state(format!(
                "assignment {} is closed, responses can no longer be submitted",
                assignment.id
            )))
        }
    }

    pub fn ensure_can_grade(assignment: &Assignment) -> Result<()> {
        if Self::can_grade(assignment) {
            Ok(())
        } else {
            Err(GroupworkError::invalid_state(format!(
                "assignment {} is already closed and graded",
                assignment.id
            )))
        }
    }

    /// 在事务内创建 Open 任务、唯一小组及其成员
    ///
    /// 约束检查与写入共用同一事务，检查失败时不产生任何写入。
    pub async fn create(
        tx: &dyn StorageTransaction,
        new: NewAssignment,
        student_ids: &[i64],
    ) -> Result<(Assignment, Group)> {
        checker::check_group(tx, student_ids, new.teacher_id).await?;

        let assignment = tx.insert_assignment(new).await?;
        let group = tx.insert_group(assignment.id).await?;
        for &student_id in student_ids {
            tx.insert_group_member(group.id, student_id).await?;
        }

        Ok((assignment, group))
    }

    /// Open -> Closed；任务已关闭时失败，不会静默成功
    pub async fn close(tx: &dyn StorageTransaction, assignment_id: i64) -> Result<()> {
        if tx.close_assignment(assignment_id).await? {
            info!("Assignment {} closed", assignment_id);
            Ok(())
        } else {
            warn!(
                "Close of assignment {} lost the race: already closed",
                assignment_id
            );
            Err(GroupworkError::invalid_state(format!(
                "assignment {assignment_id} is already closed"
            )))
        }
    }
}
