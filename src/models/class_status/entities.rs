use serde::Serialize;
use ts_rs::TS;

use crate::models::assignments::entities::AssignmentStatus;

/// 学生在某位教师任务中的一次参与
#[derive(Debug, Clone, PartialEq)]
pub struct Participation {
    pub student_id: i64,
    pub assignment_id: i64,
    pub status: AssignmentStatus,
    pub group_size: u32,
    pub score: Option<i32>,
}

// 班级状态中的单个学生
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class_status.ts")]
pub struct StudentStatus {
    pub student_id: i64,
    pub username: String,
    pub display_name: String,
    pub open_count: u32,
    pub closed_count: u32,
    pub weighted_average: Option<f64>,
}

impl StudentStatus {
    pub fn assignment_count(&self) -> u32 {
        self.open_count + self.closed_count
    }
}
