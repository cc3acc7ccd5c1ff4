//! 写事务实现

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;

use super::{aggregation, assignments, db_error, grades, groups, submissions};
use crate::errors::Result;
use crate::models::{
    assignments::entities::{Assignment, Group, NewAssignment},
    grades::entities::Grade,
    submissions::entities::Submission,
};
use crate::storage::{PairHistory, StorageTransaction};

/// 基于 [`DatabaseTransaction`] 的写事务，丢弃即回滚
pub struct SeaOrmTransaction {
    tx: DatabaseTransaction,
}

impl SeaOrmTransaction {
    pub(super) fn new(tx: DatabaseTransaction) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl PairHistory for SeaOrmTransaction {
    async fn count_shared_assignments(
        &self,
        student_a: i64,
        student_b: i64,
        teacher_id: i64,
    ) -> Result<u64> {
        aggregation::count_shared_assignments(&self.tx, student_a, student_b, teacher_id).await
    }
}

#[async_trait]
impl StorageTransaction for SeaOrmTransaction {
    async fn insert_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        assignments::insert_assignment(&self.tx, assignment).await
    }

    async fn insert_group(&self, assignment_id: i64) -> Result<Group> {
        groups::insert_group(&self.tx, assignment_id).await
    }

    async fn insert_group_member(&self, group_id: i64, student_id: i64) -> Result<()> {
        groups::insert_group_member(&self.tx, group_id, student_id).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        assignments::get_assignment_by_id(&self.tx, id).await
    }

    async fn get_group_by_id(&self, group_id: i64) -> Result<Option<Group>> {
        groups::get_group_by_id(&self.tx, group_id).await
    }

    async fn get_student_group(
        &self,
        student_id: i64,
        assignment_id: i64,
    ) -> Result<Option<Group>> {
        groups::get_student_group(&self.tx, student_id, assignment_id).await
    }

    async fn get_submission_by_group(&self, group_id: i64) -> Result<Option<Submission>> {
        submissions::get_submission_by_group(&self.tx, group_id).await
    }

    async fn try_insert_submission(
        &self,
        group_id: i64,
        content: &str,
    ) -> Result<Option<Submission>> {
        submissions::try_insert_submission(&self.tx, group_id, content).await
    }

    async fn update_submission(&self, submission_id: i64, content: &str) -> Result<Submission> {
        submissions::update_submission(&self.tx, submission_id, content).await
    }

    async fn close_assignment(&self, assignment_id: i64) -> Result<bool> {
        assignments::close_assignment(&self.tx, assignment_id).await
    }

    async fn insert_grade(&self, assignment_id: i64, group_id: i64, score: i32) -> Result<Grade> {
        grades::insert_grade(&self.tx, assignment_id, group_id, score).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))
    }
}
