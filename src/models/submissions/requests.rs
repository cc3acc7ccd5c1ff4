use serde::Deserialize;
use ts_rs::TS;

// 提交或更新回答
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmitResponseRequest {
    pub content: String,
}
