use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 任务状态：只允许 open -> closed 一次
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum AssignmentStatus {
    Open,
    Closed,
}

impl AssignmentStatus {
    pub const OPEN: &'static str = "open";
    pub const CLOSED: &'static str = "closed";
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Open => write!(f, "{}", AssignmentStatus::OPEN),
            AssignmentStatus::Closed => write!(f, "{}", AssignmentStatus::CLOSED),
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AssignmentStatus::OPEN => Ok(AssignmentStatus::Open),
            AssignmentStatus::CLOSED => Ok(AssignmentStatus::Closed),
            _ => Err(format!("Invalid assignment status: {s}")),
        }
    }
}

// 任务实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub teacher_id: i64,
    pub status: AssignmentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Assignment {
    pub fn is_open(&self) -> bool {
        self.status == AssignmentStatus::Open
    }

    pub fn is_owned_by(&self, teacher_id: i64) -> bool {
        self.teacher_id == teacher_id
    }
}

// 小组实体（每个任务一个）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Group {
    pub id: i64,
    pub assignment_id: i64,
}

// 新任务的写入数据，由生命周期在事务内落库
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub teacher_id: i64,
}
