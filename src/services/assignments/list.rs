use super::AssignmentService;
use crate::errors::Result;
use crate::models::{
    assignments::{entities::AssignmentStatus, responses::AssignmentListResponse},
    users::entities::{User, UserRole},
};

/// 开放任务：教师看到自己创建的，学生看到自己所在小组的
pub async fn list_open_assignments(
    service: &AssignmentService,
    caller: &User,
) -> Result<AssignmentListResponse> {
    let items = match caller.role {
        UserRole::Teacher => {
            service
                .storage
                .list_assignments_by_teacher(caller.id, Some(AssignmentStatus::Open))
                .await?
        }
        UserRole::Student => {
            service
                .storage
                .list_open_assignments_for_student(caller.id)
                .await?
        }
    };

    Ok(AssignmentListResponse { items })
}

#[cfg(test)]
mod tests {
    use crate::test_support::setup;

    #[tokio::test]
    async fn open_assignments_are_listed_by_role() {
        let ctx = setup().await;

        let first = ctx.create(&ctx.teacher, &[0, 1]).await.expect("create");
        let second = ctx.create(&ctx.teacher, &[2, 3]).await.expect("create");
        ctx.create(&ctx.other_teacher, &[0, 4])
            .await
            .expect("create");

        let teacher_view = ctx
            .assignments()
            .list_open_assignments(&ctx.teacher)
            .await
            .expect("teacher list");
        let ids: Vec<i64> = teacher_view.items.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![first.assignment.id, second.assignment.id]);

        let student_view = ctx
            .assignments()
            .list_open_assignments(ctx.student(0))
            .await
            .expect("student list");
        assert_eq!(student_view.items.len(), 2);
        assert!(
            student_view
                .items
                .iter()
                .all(|a| a.id != second.assignment.id)
        );

        let lonely = ctx
            .assignments()
            .list_open_assignments(ctx.student(5))
            .await
            .expect("student list");
        assert!(lonely.items.is_empty());
    }

    #[tokio::test]
    async fn graded_assignments_leave_the_open_list() {
        let ctx = setup().await;
        ctx.create_graded(&ctx.teacher, &[0, 1], 27).await;

        let open = ctx
            .assignments()
            .list_open_assignments(&ctx.teacher)
            .await
            .expect("list");
        assert!(open.items.is_empty());
        let open = ctx
            .assignments()
            .list_open_assignments(ctx.student(1))
            .await
            .expect("list");
        assert!(open.items.is_empty());
    }
}
