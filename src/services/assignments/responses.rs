use super::AssignmentService;
use crate::errors::{GroupworkError, Result};
use crate::models::{
    assignments::{
        entities::{Assignment, Group},
        responses::{AssignmentResponsesView, GroupSubmissionView},
    },
    users::entities::StudentSummary,
};

async fn find_assignment(service: &AssignmentService, assignment_id: i64) -> Result<Assignment> {
    service
        .storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| {
            GroupworkError::not_found(format!("assignment {assignment_id} does not exist"))
        })
}

async fn group_view(service: &AssignmentService, group: Group) -> Result<GroupSubmissionView> {
    let storage = &service.storage;

    let members = storage.list_group_members(group.id).await?;
    let submission = storage.get_submission_by_group(group.id).await?;
    let grade = storage
        .get_grade_by_assignment_and_group(group.assignment_id, group.id)
        .await?;

    Ok(GroupSubmissionView {
        group_id: group.id,
        members: members.into_iter().map(StudentSummary::from).collect(),
        submission,
        grade,
    })
}

/// 教师查看任务下各小组的回答
pub async fn teacher_view(
    service: &AssignmentService,
    teacher_id: i64,
    assignment_id: i64,
) -> Result<AssignmentResponsesView> {
    let assignment = find_assignment(service, assignment_id).await?;
    if !assignment.is_owned_by(teacher_id) {
        return Err(GroupworkError::forbidden(format!(
            "assignment {assignment_id} belongs to another teacher"
        )));
    }

    let mut groups = Vec::new();
    for group in service.storage.list_groups_by_assignment(assignment.id).await? {
        groups.push(group_view(service, group).await?);
    }

    Ok(AssignmentResponsesView { assignment, groups })
}

/// 学生查看自己小组的回答
///
/// 先确认成员身份：不在任何小组（包括任务不存在）时一律 Forbidden，与提交接口一致。
pub async fn student_view(
    service: &AssignmentService,
    student_id: i64,
    assignment_id: i64,
) -> Result<GroupSubmissionView> {
    let group = service
        .storage
        .get_student_group(student_id, assignment_id)
        .await?
        .ok_or_else(|| {
            GroupworkError::forbidden(format!(
                "student {student_id} is not in a group for assignment {assignment_id}"
            ))
        })?;

    group_view(service, group).await
}

#[cfg(test)]
mod tests {
    use crate::errors::GroupworkError;
    use crate::test_support::setup;

    #[tokio::test]
    async fn student_view_checks_membership_before_existence() {
        let ctx = setup().await;
        let created = ctx.create(&ctx.teacher, &[0, 1]).await.expect("create");

        assert!(matches!(
            ctx.assignments()
                .student_response(ctx.student(2).id, created.assignment.id)
                .await,
            Err(GroupworkError::Forbidden(_))
        ));
        // 不存在的任务与不在小组中结果相同
        assert!(matches!(
            ctx.assignments()
                .student_response(ctx.student(0).id, 31_337)
                .await,
            Err(GroupworkError::Forbidden(_))
        ));
        assert!(matches!(
            ctx.submissions()
                .submit_response(ctx.student(0).id, 31_337, "risposta")
                .await,
            Err(GroupworkError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn student_view_before_any_submission() {
        let ctx = setup().await;
        let created = ctx.create(&ctx.teacher, &[0, 1, 2]).await.expect("create");

        let view = ctx
            .assignments()
            .student_response(ctx.student(2).id, created.assignment.id)
            .await
            .expect("member can view");
        assert_eq!(view.group_id, created.group_id);
        assert_eq!(view.members.len(), 3);
        assert!(view.submission.is_none());
        assert!(view.grade.is_none());
    }

    #[tokio::test]
    async fn teacher_view_is_owner_only() {
        let ctx = setup().await;
        let created = ctx.create(&ctx.teacher, &[0, 1]).await.expect("create");

        assert!(matches!(
            ctx.assignments()
                .teacher_responses(ctx.other_teacher.id, created.assignment.id)
                .await,
            Err(GroupworkError::Forbidden(_))
        ));
        assert!(matches!(
            ctx.assignments()
                .teacher_responses(ctx.teacher.id, 31_337)
                .await,
            Err(GroupworkError::NotFound(_))
        ));
    }
}
