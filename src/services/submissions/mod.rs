pub mod submit;

use std::sync::Arc;

use crate::errors::Result;
use crate::models::submissions::entities::SubmitResult;
use crate::storage::Storage;

pub struct SubmissionService {
    storage: Arc<dyn Storage>,
}

impl SubmissionService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // 提交或更新本组回答
    pub async fn submit_response(
        &self,
        student_id: i64,
        assignment_id: i64,
        content: &str,
    ) -> Result<SubmitResult> {
        submit::submit_response(self, student_id, assignment_id, content).await
    }
}
