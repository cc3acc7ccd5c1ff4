pub mod create;
pub mod lifecycle;
pub mod list;
pub mod responses;

use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    assignments::{
        requests::CreateAssignmentRequest,
        responses::{
            AssignmentListResponse, AssignmentResponsesView, CreatedAssignmentResponse,
            GroupSubmissionView,
        },
    },
    users::entities::User,
};
use crate::storage::Storage;

pub use lifecycle::AssignmentLifecycle;

pub struct AssignmentService {
    storage: Arc<dyn Storage>,
}

impl AssignmentService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // 创建任务及其小组
    pub async fn create_assignment(
        &self,
        teacher_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<CreatedAssignmentResponse> {
        create::create_assignment(self, teacher_id, req).await
    }

    // 列出开放任务
    pub async fn list_open_assignments(&self, caller: &User) -> Result<AssignmentListResponse> {
        list::list_open_assignments(self, caller).await
    }

    // 教师查看回答
    pub async fn teacher_responses(
        &self,
        teacher_id: i64,
        assignment_id: i64,
    ) -> Result<AssignmentResponsesView> {
        responses::teacher_view(self, teacher_id, assignment_id).await
    }

    // 学生查看本组回答
    pub async fn student_response(
        &self,
        student_id: i64,
        assignment_id: i64,
    ) -> Result<GroupSubmissionView> {
        responses::student_view(self, student_id, assignment_id).await
    }
}
