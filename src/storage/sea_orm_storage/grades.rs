//! 评分存储操作

use crate::entity::grades::Column;
use crate::entity::prelude::{GradeActiveModel, Grades};
use super::db_error;
use crate::errors::Result;
use crate::models::grades::entities::Grade;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

pub(super) async fn insert_grade<C: ConnectionTrait>(
    conn: &C,
    assignment_id: i64,
    group_id: i64,
    score: i32,
) -> Result<Grade> {
    let model = GradeActiveModel {
        assignment_id: Set(assignment_id),
        group_id: Set(group_id),
        score: Set(score),
        graded_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };

    let result = model
        .insert(conn)
        .await
        .map_err(|e| db_error("创建评分失败", e))?;

    Ok(result.into_grade())
}

pub(super) async fn get_grade_by_assignment_and_group<C: ConnectionTrait>(
    conn: &C,
    assignment_id: i64,
    group_id: i64,
) -> Result<Option<Grade>> {
    let result = Grades::find()
        .filter(Column::AssignmentId.eq(assignment_id))
        .filter(Column::GroupId.eq(group_id))
        .one(conn)
        .await
        .map_err(|e| db_error("查询评分失败", e))?;

    Ok(result.map(|m| m.into_grade()))
}
