use crate::entity::prelude::{AssignmentActiveModel, Assignments, GroupMembers, Groups};
use crate::entity::{assignments::Column, group_members, groups};
use super::db_error;
use crate::errors::Result;
use crate::models::assignments::entities::{Assignment, AssignmentStatus, NewAssignment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::Expr,
};

pub(super) async fn insert_assignment<C: ConnectionTrait>(
    conn: &C,
    new: NewAssignment,
) -> Result<Assignment> {
    let model = AssignmentActiveModel {
        title: Set(new.title),
        description: Set(new.description),
        teacher_id: Set(new.teacher_id),
        status: Set(AssignmentStatus::Open.to_string()),
        created_at: Set(chrono::Utc::now().timestamp()),
        closed_at: Set(None),
        ..Default::default()
    };

    let result = model
        .insert(conn)
        .await
        .map_err(|e| db_error("创建任务失败", e))?;

    Ok(result.into_assignment())
}

/// 通过 ID 获取任务
pub(super) async fn get_assignment_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<Assignment>> {
    let result = Assignments::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| db_error("查询任务失败", e))?;

    Ok(result.map(|m| m.into_assignment()))
}

pub(super) async fn list_assignments_by_teacher<C: ConnectionTrait>(
    conn: &C,
    teacher_id: i64,
    status: Option<AssignmentStatus>,
) -> Result<Vec<Assignment>> {
    let mut select = Assignments::find().filter(Column::TeacherId.eq(teacher_id));

    if let Some(status) = status {
        select = select.filter(Column::Status.eq(status.to_string()));
    }

    let result = select
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| db_error("查询教师任务失败", e))?;

    Ok(result.into_iter().map(|m| m.into_assignment()).collect())
}

/// 学生所在小组的开放任务
pub(super) async fn list_open_assignments_for_student<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
) -> Result<Vec<Assignment>> {
    let group_ids: Vec<i64> = GroupMembers::find()
        .select_only()
        .column(group_members::Column::GroupId)
        .filter(group_members::Column::StudentId.eq(student_id))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| db_error("查询学生小组失败", e))?;

    if group_ids.is_empty() {
        return Ok(Vec::new());
    }

    let assignment_ids: Vec<i64> = Groups::find()
        .select_only()
        .column(groups::Column::AssignmentId)
        .filter(groups::Column::Id.is_in(group_ids))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| db_error("查询小组任务失败", e))?;

    let result = Assignments::find()
        .filter(Column::Id.is_in(assignment_ids))
        .filter(Column::Status.eq(AssignmentStatus::OPEN))
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| db_error("查询开放任务失败", e))?;

    Ok(result.into_iter().map(|m| m.into_assignment()).collect())
}

/// 仅当任务仍为 open 时将其关闭
///
/// 条件更新本身即为比较并设置，`rows_affected == 1` 说明本次调用完成了状态迁移。
pub(super) async fn close_assignment<C: ConnectionTrait>(
    conn: &C,
    assignment_id: i64,
) -> Result<bool> {
    let now = chrono::Utc::now().timestamp();

    let result = Assignments::update_many()
        .col_expr(Column::Status, Expr::value(AssignmentStatus::CLOSED))
        .col_expr(Column::ClosedAt, Expr::value(now))
        .filter(Column::Id.eq(assignment_id))
        .filter(Column::Status.eq(AssignmentStatus::OPEN))
        .exec(conn)
        .await
        .map_err(|e| db_error("关闭任务失败", e))?;

    Ok(result.rows_affected == 1)
}
