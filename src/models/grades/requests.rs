use serde::Deserialize;
use ts_rs::TS;

// 评分请求，score 以 JSON 数字接收，整数校验在业务层完成
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeAssignmentRequest {
    pub group_id: i64,
    pub score: f64,
}
