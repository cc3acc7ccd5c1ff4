use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级状态排序方式
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/class_status.ts")]
pub enum ClassStatusOrder {
    #[default]
    Alphabetical,
    AssignmentCount,
    Average,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class_status.ts")]
pub struct ClassStatusQuery {
    #[serde(default)]
    pub order: ClassStatusOrder,
}
