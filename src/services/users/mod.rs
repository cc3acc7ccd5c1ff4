use std::sync::Arc;

use crate::errors::Result;
use crate::models::users::entities::StudentSummary;
use crate::storage::Storage;

pub struct UserService {
    storage: Arc<dyn Storage>,
}

impl UserService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 学生目录，供教师组建小组
    pub async fn list_students(&self) -> Result<Vec<StudentSummary>> {
        let students = self.storage.list_students().await?;
        Ok(students.into_iter().map(StudentSummary::from).collect())
    }
}
