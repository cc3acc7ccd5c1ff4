use super::GradingService;
use super::average::weighted_average;
use crate::errors::Result;
use crate::models::grades::responses::StudentGradesResponse;

/// 学生成绩视图：所有教师的已关闭任务
pub async fn student_grades(
    service: &GradingService,
    student_id: i64,
) -> Result<StudentGradesResponse> {
    let grades = service.storage.list_student_grades(student_id).await?;
    let average = weighted_average(grades.iter().map(|g| (g.score, g.group_size)));

    Ok(StudentGradesResponse { grades, average })
}

#[cfg(test)]
mod tests {
    use crate::test_support::setup;

    #[tokio::test]
    async fn student_average_weights_each_grade_by_group_size() {
        let ctx = setup().await;

        ctx.create_graded(&ctx.teacher, &[0, 1], 22).await;
        ctx.create_graded(&ctx.teacher, &[0, 2], 29).await;

        let view = ctx
            .grading()
            .student_grades(ctx.student(0).id)
            .await
            .expect("grades");
        assert_eq!(view.grades.len(), 2);
        assert_eq!(view.average, Some(25.5));

        ctx.create_graded(&ctx.teacher, &[0, 3], 20).await;
        ctx.create_graded(&ctx.other_teacher, &[0, 4], 30).await;

        let view = ctx
            .grading()
            .student_grades(ctx.student(0).id)
            .await
            .expect("grades");
        assert_eq!(view.grades.len(), 4);
        assert_eq!(view.average, Some(25.25));
        assert!(view.grades.iter().all(|g| g.group_size == 2));
        assert!(
            view.grades
                .iter()
                .any(|g| g.teacher_email == ctx.other_teacher.email)
        );
    }

    #[tokio::test]
    async fn open_assignments_do_not_count_towards_grades() {
        let ctx = setup().await;
        ctx.create(&ctx.teacher, &[0, 1]).await.expect("create");

        let view = ctx
            .grading()
            .student_grades(ctx.student(0).id)
            .await
            .expect("grades");
        assert!(view.grades.is_empty());
        assert_eq!(view.average, None);

        ctx.create_graded(&ctx.teacher, &[0, 1, 2], 24).await;
        let view = ctx
            .grading()
            .student_grades(ctx.student(0).id)
            .await
            .expect("grades");
        assert_eq!(view.grades.len(), 1);
        assert_eq!(view.grades[0].group_size, 3);
        assert_eq!(view.average, Some(24.0));
    }
}
