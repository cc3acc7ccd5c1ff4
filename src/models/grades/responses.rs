use serde::Serialize;
use ts_rs::TS;

use super::entities::{Grade, GradeRecord};

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeResponse {
    pub grade: Grade,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct StudentGradesResponse {
    pub grades: Vec<GradeRecord>,
    pub average: Option<f64>,
}
