use serde::Serialize;
use ts_rs::TS;

use super::entities::StudentStatus;
use super::requests::ClassStatusOrder;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class_status.ts")]
pub struct ClassStatusResponse {
    pub order: ClassStatusOrder,
    pub items: Vec<StudentStatus>,
}
