use serde::Serialize;
use ts_rs::TS;

use super::entities::Assignment;
use crate::models::grades::entities::Grade;
use crate::models::submissions::entities::Submission;
use crate::models::users::entities::StudentSummary;

// 创建任务响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreatedAssignmentResponse {
    pub assignment: Assignment,
    pub group_id: i64,
    pub members: Vec<StudentSummary>,
}

// 开放任务列表
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
}

// 小组及其回答
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct GroupSubmissionView {
    pub group_id: i64,
    pub members: Vec<StudentSummary>,
    pub submission: Option<Submission>,
    pub grade: Option<Grade>,
}

// 教师查看任务下所有小组的回答
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentResponsesView {
    pub assignment: Assignment,
    pub groups: Vec<GroupSubmissionView>,
}

// 小组成员列表
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct GroupMembersResponse {
    pub group_id: i64,
    pub assignment_id: i64,
    pub members: Vec<StudentSummary>,
}
