pub mod average;
pub mod grade;
pub mod student;

use std::sync::Arc;

use crate::errors::Result;
use crate::models::grades::{entities::Grade, responses::StudentGradesResponse};
use crate::storage::Storage;

pub use average::weighted_average;

pub struct GradingService {
    storage: Arc<dyn Storage>,
}

impl GradingService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // 评分并关闭任务
    pub async fn grade_assignment(
        &self,
        teacher_id: i64,
        assignment_id: i64,
        group_id: i64,
        score: f64,
    ) -> Result<Grade> {
        grade::grade_assignment(self, teacher_id, assignment_id, group_id, score).await
    }

    // 学生成绩及加权平均
    pub async fn student_grades(&self, student_id: i64) -> Result<StudentGradesResponse> {
        student::student_grades(self, student_id).await
    }
}
