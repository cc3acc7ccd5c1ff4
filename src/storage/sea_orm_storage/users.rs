use crate::entity::prelude::{UserActiveModel, Users};
use crate::entity::users::Column;
use super::db_error;
use crate::errors::Result;
use crate::models::users::{
    entities::{User, UserRole},
    requests::CreateUserRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

/// 创建用户
pub(super) async fn create_user<C: ConnectionTrait>(
    conn: &C,
    req: CreateUserRequest,
) -> Result<User> {
    let model = UserActiveModel {
        username: Set(req.username),
        email: Set(req.email),
        password_hash: Set(req.password),
        role: Set(req.role.to_string()),
        display_name: Set(req.display_name),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };

    let result = model
        .insert(conn)
        .await
        .map_err(|e| db_error("创建用户失败", e))?;

    Ok(result.into_user())
}

pub(super) async fn count_users<C: ConnectionTrait>(conn: &C) -> Result<u64> {
    Users::find()
        .count(conn)
        .await
        .map_err(|e| db_error("统计用户数量失败", e))
}

/// 通过 ID 获取用户
pub(super) async fn get_user_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<User>> {
    let result = Users::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| db_error("查询用户失败", e))?;

    Ok(result.map(|m| m.into_user()))
}

/// 通过用户名获取用户
pub(super) async fn get_user_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<User>> {
    let result = Users::find()
        .filter(Column::Username.eq(username))
        .one(conn)
        .await
        .map_err(|e| db_error("查询用户失败", e))?;

    Ok(result.map(|m| m.into_user()))
}

pub(super) async fn get_users_by_ids<C: ConnectionTrait>(
    conn: &C,
    ids: &[i64],
) -> Result<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let result = Users::find()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| db_error("批量查询用户失败", e))?;

    Ok(result.into_iter().map(|m| m.into_user()).collect())
}

/// 列出所有学生
pub(super) async fn list_students<C: ConnectionTrait>(conn: &C) -> Result<Vec<User>> {
    let result = Users::find()
        .filter(Column::Role.eq(UserRole::STUDENT))
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| db_error("查询学生列表失败", e))?;

    Ok(result.into_iter().map(|m| m.into_user()).collect())
}
