pub mod assignments;

pub mod auth;

pub mod class_status;

pub mod grades;

pub mod groups;

pub mod students;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde::Serialize;
use tracing::{error, info};
use ts_rs::TS;

use crate::errors::{GroupworkError, Result};
use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

pub use assignments::configure_assignments_routes;
pub use auth::configure_auth_routes;
pub use class_status::configure_class_status_routes;
pub use grades::configure_grades_routes;
pub use groups::configure_groups_routes;
pub use students::configure_students_routes;

/// 业务错误对应的 HTTP 状态码
pub(crate) fn error_status(err: &GroupworkError) -> StatusCode {
    match err {
        GroupworkError::Validation(_) => StatusCode::BAD_REQUEST,
        GroupworkError::ConstraintViolation(_) => StatusCode::CONFLICT,
        GroupworkError::Forbidden(_) => StatusCode::FORBIDDEN,
        GroupworkError::NotFound(_) => StatusCode::NOT_FOUND,
        GroupworkError::InvalidState(_) => StatusCode::CONFLICT,
        GroupworkError::Authentication(_) => StatusCode::UNAUTHORIZED,
        // 重试用尽仍冲突，客户端可稍后重发
        GroupworkError::TransactionConflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(err: &GroupworkError) -> HttpResponse {
    if err.is_business_outcome() {
        info!("Request rejected: {}", err);
    } else {
        error!("Request failed: {}", err);
    }
    HttpResponse::build(error_status(err)).json(ApiResponse::from_error(err))
}

/// 把服务层结果转换为统一响应
pub(crate) fn respond<T: TS + Serialize>(
    result: Result<T>,
    status: StatusCode,
    message: &str,
) -> ActixResult<HttpResponse> {
    match result {
        Ok(data) => Ok(HttpResponse::build(status).json(ApiResponse::success(data, message))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 取出 RequireJWT 解析出的当前用户
pub(crate) fn current_user(req: &HttpRequest) -> std::result::Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(req).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unable to resolve current user",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&GroupworkError::validation("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&GroupworkError::constraint_violation("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&GroupworkError::forbidden("x")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            error_status(&GroupworkError::not_found("x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&GroupworkError::invalid_state("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&GroupworkError::transaction_conflict("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&GroupworkError::store_failure("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_status() {
        let resp = error_response(&GroupworkError::forbidden("not yours"));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
