//! 存储层抽象
//!
//! 业务组件只依赖这里的 trait。只读查询直接走 [`Storage`]，
//! 所有写操作都在 [`Storage::begin`] 打开的 [`StorageTransaction`] 中完成，
//! 未提交即被丢弃的事务会回滚。

use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    assignments::entities::{Assignment, AssignmentStatus, Group, NewAssignment},
    class_status::entities::Participation,
    grades::entities::{Grade, GradeRecord},
    submissions::entities::Submission,
    users::{entities::User, requests::CreateUserRequest},
};

pub mod sea_orm_storage;

/// 两名学生在同一教师任务中的共同分组历史
#[async_trait::async_trait]
pub trait PairHistory: Send + Sync {
    /// 统计 `student_a` 与 `student_b` 在 `teacher_id` 的不同任务中同组的次数
    async fn count_shared_assignments(
        &self,
        student_a: i64,
        student_b: i64,
        teacher_id: i64,
    ) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（密码已哈希）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 批量获取用户，按 ID 升序
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 列出所有学生，按 ID 升序
    async fn list_students(&self) -> Result<Vec<User>>;

    /// 任务方法
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 列出教师的任务，可按状态过滤
    async fn list_assignments_by_teacher(
        &self,
        teacher_id: i64,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<Assignment>>;
    // 列出学生所在小组的开放任务
    async fn list_open_assignments_for_student(&self, student_id: i64) -> Result<Vec<Assignment>>;

    /// 小组方法
    async fn get_group_by_id(&self, group_id: i64) -> Result<Option<Group>>;
    async fn list_groups_by_assignment(&self, assignment_id: i64) -> Result<Vec<Group>>;
    async fn list_group_members(&self, group_id: i64) -> Result<Vec<User>>;
    async fn get_student_group(&self, student_id: i64, assignment_id: i64)
    -> Result<Option<Group>>;

    /// 回答与评分方法
    async fn get_submission_by_group(&self, group_id: i64) -> Result<Option<Submission>>;
    async fn get_grade_by_assignment_and_group(
        &self,
        assignment_id: i64,
        group_id: i64,
    ) -> Result<Option<Grade>>;

    /// 聚合查询
    // 学生所有已关闭且已评分任务的成绩（跨教师）
    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<GradeRecord>>;
    // 教师所有任务中每个学生的参与记录
    async fn list_teacher_participations(&self, teacher_id: i64) -> Result<Vec<Participation>>;

    /// 开启写事务
    async fn begin(&self) -> Result<Box<dyn StorageTransaction>>;
}

/// 写事务
///
/// 同一请求内的检查与写入共用一个事务，调用 [`StorageTransaction::commit`] 前的所有写入
/// 对其他连接不可见。
#[async_trait::async_trait]
pub trait StorageTransaction: PairHistory {
    async fn insert_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn insert_group(&self, assignment_id: i64) -> Result<Group>;
    async fn insert_group_member(&self, group_id: i64, student_id: i64) -> Result<()>;

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn get_group_by_id(&self, group_id: i64) -> Result<Option<Group>>;
    async fn get_student_group(&self, student_id: i64, assignment_id: i64)
    -> Result<Option<Group>>;
    async fn get_submission_by_group(&self, group_id: i64) -> Result<Option<Submission>>;

    /// 插入小组回答；若该小组已有回答（并发插入）返回 `None`
    async fn try_insert_submission(
        &self,
        group_id: i64,
        content: &str,
    ) -> Result<Option<Submission>>;
    async fn update_submission(&self, submission_id: i64, content: &str) -> Result<Submission>;

    /// 比较并设置：仅当任务仍为 open 时关闭，返回是否由本次调用完成关闭
    async fn close_assignment(&self, assignment_id: i64) -> Result<bool>;
    async fn insert_grade(&self, assignment_id: i64, group_id: i64, score: i32) -> Result<Grade>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
