use crate::entity::prelude::{GroupActiveModel, GroupMemberActiveModel, GroupMembers, Groups};
use crate::entity::{group_members, groups::Column};
use super::db_error;
use crate::errors::Result;
use crate::models::{assignments::entities::Group, users::entities::User};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

pub(super) async fn insert_group<C: ConnectionTrait>(conn: &C, assignment_id: i64) -> Result<Group> {
    let model = GroupActiveModel {
        assignment_id: Set(assignment_id),
        ..Default::default()
    };

    let result = model
        .insert(conn)
        .await
        .map_err(|e| db_error("创建小组失败", e))?;

    Ok(result.into_group())
}

pub(super) async fn insert_group_member<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
    student_id: i64,
) -> Result<()> {
    let model = GroupMemberActiveModel {
        group_id: Set(group_id),
        student_id: Set(student_id),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| db_error("添加小组成员失败", e))?;

    Ok(())
}

pub(super) async fn get_group_by_id<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
) -> Result<Option<Group>> {
    let result = Groups::find_by_id(group_id)
        .one(conn)
        .await
        .map_err(|e| db_error("查询小组失败", e))?;

    Ok(result.map(|m| m.into_group()))
}

pub(super) async fn list_groups_by_assignment<C: ConnectionTrait>(
    conn: &C,
    assignment_id: i64,
) -> Result<Vec<Group>> {
    let result = Groups::find()
        .filter(Column::AssignmentId.eq(assignment_id))
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| db_error("查询任务小组失败", e))?;

    Ok(result.into_iter().map(|m| m.into_group()).collect())
}

/// 小组成员，按学生 ID 升序
pub(super) async fn list_group_members<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
) -> Result<Vec<User>> {
    let student_ids: Vec<i64> = GroupMembers::find()
        .select_only()
        .column(group_members::Column::StudentId)
        .filter(group_members::Column::GroupId.eq(group_id))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| db_error("查询小组成员失败", e))?;

    super::users::get_users_by_ids(conn, &student_ids).await
}

/// 学生在指定任务中的小组
pub(super) async fn get_student_group<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
    assignment_id: i64,
) -> Result<Option<Group>> {
    let group_ids: Vec<i64> = GroupMembers::find()
        .select_only()
        .column(group_members::Column::GroupId)
        .filter(group_members::Column::StudentId.eq(student_id))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| db_error("查询学生小组失败", e))?;

    if group_ids.is_empty() {
        return Ok(None);
    }

    let result = Groups::find()
        .filter(Column::Id.is_in(group_ids))
        .filter(Column::AssignmentId.eq(assignment_id))
        .one(conn)
        .await
        .map_err(|e| db_error("查询学生小组失败", e))?;

    Ok(result.map(|m| m.into_group()))
}
