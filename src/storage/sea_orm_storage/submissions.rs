use crate::entity::prelude::{SubmissionActiveModel, Submissions};
use crate::entity::submissions::Column;
use super::db_error;
use crate::errors::Result;
use crate::models::submissions::entities::Submission;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
};

pub(super) async fn get_submission_by_group<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
) -> Result<Option<Submission>> {
    let result = Submissions::find()
        .filter(Column::GroupId.eq(group_id))
        .one(conn)
        .await
        .map_err(|e| db_error("查询小组回答失败", e))?;

    Ok(result.map(|m| m.into_submission()))
}

/// 插入小组回答，`group_id` 唯一约束冲突时返回 `None`
pub(super) async fn try_insert_submission<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
    content: &str,
) -> Result<Option<Submission>> {
    let now = chrono::Utc::now().timestamp();

    let model = SubmissionActiveModel {
        group_id: Set(group_id),
        content: Set(content.to_string()),
        submitted_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match model.insert(conn).await {
        Ok(result) => Ok(Some(result.into_submission())),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(None),
        Err(e) => Err(db_error("创建小组回答失败", e)),
    }
}

/// 覆盖回答内容，不保留历史
pub(super) async fn update_submission<C: ConnectionTrait>(
    conn: &C,
    submission_id: i64,
    content: &str,
) -> Result<Submission> {
    let model = SubmissionActiveModel {
        id: Set(submission_id),
        content: Set(content.to_string()),
        updated_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };

    let result = model
        .update(conn)
        .await
        .map_err(|e| db_error("更新小组回答失败", e))?;

    Ok(result.into_submission())
}
