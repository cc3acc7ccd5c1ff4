use tracing::info;

use super::GradingService;
use crate::errors::{GroupworkError, Result};
use crate::models::grades::entities::Grade;
use crate::services::assignments::AssignmentLifecycle;
use crate::services::retry::with_tx_retry;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 30;

/// 分数必须是 [0, 30] 内的整数
pub fn validate_score(score: f64) -> Result<i32> {
    if !score.is_finite() || score.fract() != 0.0 {
        return Err(GroupworkError::validation(format!(
            "score must be an integer, got {score}"
        )));
    }
    if score < f64::from(MIN_SCORE) || score > f64::from(MAX_SCORE) {
        return Err(GroupworkError::validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        )));
    }
    Ok(score as i32)
}

/// 记录评分并关闭任务
///
/// 检查顺序：任务存在、归属、状态、分数、小组、回答。
/// 关闭与插入评分在同一事务中提交，关闭为比较并设置，保证每个任务至多一条评分。
/// 事务冲突时整体重新执行，落败方在新快照上看到已关闭的任务。
pub async fn grade_assignment(
    service: &GradingService,
    teacher_id: i64,
    assignment_id: i64,
    group_id: i64,
    score: f64,
) -> Result<Grade> {
    with_tx_retry("grade_assignment", move || {
        grade_once(service, teacher_id, assignment_id, group_id, score)
    })
    .await
}

async fn grade_once(
    service: &GradingService,
    teacher_id: i64,
    assignment_id: i64,
    group_id: i64,
    score: f64,
) -> Result<Grade> {
    let tx = service.storage.begin().await?;

    let assignment = tx.get_assignment_by_id(assignment_id).await?.ok_or_else(|| {
        GroupworkError::not_found(format!("assignment {assignment_id} does not exist"))
    })?;

    if !assignment.is_owned_by(teacher_id) {
        return Err(GroupworkError::forbidden(format!(
            "assignment {assignment_id} belongs to another teacher"
        )));
    }

    AssignmentLifecycle::ensure_can_grade(&assignment)?;

    let score = validate_score(score)?;

    let group = tx
        .get_group_by_id(group_id)
        .await?
        .filter(|g| g.assignment_id == assignment.id)
        .ok_or_else(|| {
            GroupworkError::not_found(format!(
                "group {group_id} does not belong to assignment {assignment_id}"
            ))
        })?;

    if tx.get_submission_by_group(group.id).await?.is_none() {
        return Err(GroupworkError::not_found(format!(
            "group {group_id} has not submitted a response yet"
        )));
    }

    AssignmentLifecycle::close(tx.as_ref(), assignment.id).await?;
    let grade = tx.insert_grade(assignment.id, group.id, score).await?;
    tx.commit().await?;

    info!(
        "Assignment {} graded {} by teacher {} (group {})",
        assignment.id, score, teacher_id, group.id
    );

    Ok(grade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentStatus;
    use crate::storage::Storage;
    use crate::test_support::{setup, setup_shared};

    #[test]
    fn test_valid_scores() {
        assert_eq!(validate_score(0.0).unwrap(), 0);
        assert_eq!(validate_score(30.0).unwrap(), 30);
        assert_eq!(validate_score(27.0).unwrap(), 27);
    }

    #[test]
    fn test_out_of_range() {
        assert!(validate_score(-1.0).is_err());
        assert!(validate_score(31.0).is_err());
    }

    #[test]
    fn test_non_integer() {
        assert!(matches!(
            validate_score(27.5),
            Err(GroupworkError::Validation(_))
        ));
        assert!(validate_score(f64::NAN).is_err());
        assert!(validate_score(f64::INFINITY).is_err());
    }

    #[tokio::test]
    async fn grading_closes_the_assignment() {
        let ctx = setup().await;
        let grade = ctx.create_graded(&ctx.teacher, &[0, 1], 27).await;
        assert_eq!(grade.score, 27);

        let assignment = ctx
            .storage
            .get_assignment_by_id(grade.assignment_id)
            .await
            .expect("lookup")
            .expect("assignment exists");
        assert_eq!(assignment.status, AssignmentStatus::Closed);
        assert!(assignment.closed_at.is_some());
    }

    #[tokio::test]
    async fn grading_is_single_use() {
        let ctx = setup().await;
        let grade = ctx.create_graded(&ctx.teacher, &[0, 1], 18).await;

        // 无论分数是否合法，第二次评分都是 InvalidState
        for score in [25.0, 99.0, 12.5] {
            assert!(matches!(
                ctx.grading()
                    .grade_assignment(ctx.teacher.id, grade.assignment_id, grade.group_id, score)
                    .await,
                Err(GroupworkError::InvalidState(_))
            ));
        }

        let stored = ctx
            .storage
            .get_grade_by_assignment_and_group(grade.assignment_id, grade.group_id)
            .await
            .expect("lookup")
            .expect("grade exists");
        assert_eq!(stored.score, 18);
    }

    #[tokio::test]
    async fn grading_checks_run_in_order() {
        let ctx = setup().await;
        let created = ctx.create(&ctx.teacher, &[0, 1]).await.expect("create");
        let (assignment_id, group_id) = (created.assignment.id, created.group_id);

        // 非所属教师，即使分数非法也先报 Forbidden
        assert!(matches!(
            ctx.grading()
                .grade_assignment(ctx.other_teacher.id, assignment_id, group_id, 45.0)
                .await,
            Err(GroupworkError::Forbidden(_))
        ));

        // 分数校验先于回答是否存在
        assert!(matches!(
            ctx.grading()
                .grade_assignment(ctx.teacher.id, assignment_id, group_id, 31.0)
                .await,
            Err(GroupworkError::Validation(_))
        ));
        assert!(matches!(
            ctx.grading()
                .grade_assignment(ctx.teacher.id, assignment_id, group_id, -1.0)
                .await,
            Err(GroupworkError::Validation(_))
        ));

        // 没有回答时是 NotFound 而不是 Validation
        assert!(matches!(
            ctx.grading()
                .grade_assignment(ctx.teacher.id, assignment_id, group_id, 20.0)
                .await,
            Err(GroupworkError::NotFound(_))
        ));

        assert!(matches!(
            ctx.grading()
                .grade_assignment(ctx.teacher.id, 31_337, group_id, 20.0)
                .await,
            Err(GroupworkError::NotFound(_))
        ));

        // 失败的评分不会关闭任务
        let assignment = ctx
            .storage
            .get_assignment_by_id(assignment_id)
            .await
            .expect("lookup")
            .expect("assignment exists");
        assert_eq!(assignment.status, AssignmentStatus::Open);
    }

    #[tokio::test]
    async fn group_must_belong_to_the_assignment() {
        let ctx = setup().await;
        let first = ctx.create(&ctx.teacher, &[0, 1]).await.expect("create");
        let second = ctx.create(&ctx.teacher, &[2, 3]).await.expect("create");

        ctx.submissions()
            .submit_response(ctx.student(2).id, second.assignment.id, "risposta")
            .await
            .expect("submit");

        assert!(matches!(
            ctx.grading()
                .grade_assignment(ctx.teacher.id, first.assignment.id, second.group_id, 20.0)
                .await,
            Err(GroupworkError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_grading_records_exactly_one_grade() {
        let ctx = setup_shared().await;
        let created = ctx.create(&ctx.teacher, &[0, 1]).await.expect("create");
        let (assignment_id, group_id) = (created.assignment.id, created.group_id);
        ctx.submissions()
            .submit_response(ctx.student(0).id, assignment_id, "risposta")
            .await
            .expect("submit");

        let handles: Vec<_> = [18.0, 21.0, 27.0, 29.0]
            .into_iter()
            .map(|score| {
                let service = ctx.grading();
                let teacher_id = ctx.teacher.id;
                tokio::spawn(async move {
                    service
                        .grade_assignment(teacher_id, assignment_id, group_id, score)
                        .await
                })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.expect("task should not panic"));
        }

        let winners: Vec<&Grade> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(
            outcomes
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, GroupworkError::InvalidState(_)))
        );

        let stored = ctx
            .storage
            .get_grade_by_assignment_and_group(assignment_id, group_id)
            .await
            .expect("lookup")
            .expect("grade exists");
        assert_eq!(stored.score, winners[0].score);

        let assignment = ctx
            .storage
            .get_assignment_by_id(assignment_id)
            .await
            .expect("lookup")
            .expect("assignment exists");
        assert_eq!(assignment.status, AssignmentStatus::Closed);
    }
}
