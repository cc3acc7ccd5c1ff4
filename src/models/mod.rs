pub mod assignments;
pub mod auth;
pub mod class_status;
pub mod common;
pub mod grades;
pub mod submissions;
pub mod users;

pub use common::response::ApiResponse;

/// 统一业务状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1050,

    // 认证错误 2000-2099
    AuthFailed = 2000,

    // 任务与评分 3000-3099
    PairLimitExceeded = 3000,
    AssignmentClosed = 3001,
}

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl From<&crate::errors::GroupworkError> for ErrorCode {
    fn from(err: &crate::errors::GroupworkError) -> Self {
        use crate::errors::GroupworkError;

        match err {
            GroupworkError::Validation(_) => ErrorCode::BadRequest,
            GroupworkError::ConstraintViolation(_) => ErrorCode::PairLimitExceeded,
            GroupworkError::Forbidden(_) => ErrorCode::Forbidden,
            GroupworkError::NotFound(_) => ErrorCode::NotFound,
            GroupworkError::InvalidState(_) => ErrorCode::AssignmentClosed,
            GroupworkError::Authentication(_) => ErrorCode::AuthFailed,
            GroupworkError::TransactionConflict(_) => ErrorCode::Conflict,
            GroupworkError::StoreFailure(_)
            | GroupworkError::DatabaseConfig(_)
            | GroupworkError::DatabaseConnection(_)
            | GroupworkError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}
