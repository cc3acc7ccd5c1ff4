use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 评分实体（每个任务至多一条）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct Grade {
    pub id: i64,
    pub assignment_id: i64,
    pub group_id: i64,
    pub score: i32,
    pub graded_at: chrono::DateTime<chrono::Utc>,
}

// 学生视角下的一条已关闭任务评分
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeRecord {
    pub assignment_id: i64,
    pub title: String,
    pub teacher_email: String,
    pub score: i32,
    /// 用于加权的小组人数
    pub group_size: u32,
    pub graded_at: chrono::DateTime<chrono::Utc>,
}
