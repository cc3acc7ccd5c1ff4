use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;

use crate::middlewares::{self, RequireRole};
use crate::models::users::entities::UserRole;
use crate::services::GradingService;
use crate::storage::Storage;

use super::{current_user, respond};

// 学生成绩（跨所有教师）
pub async fn list_my_grades(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let result = GradingService::new(storage.get_ref().clone())
        .student_grades(user.id)
        .await;
    respond(result, StatusCode::OK, "Grades retrieved successfully")
}

// 配置路由
pub fn configure_grades_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_my_grades))
                    .wrap(RequireRole::new(UserRole::Student)),
            ),
    );
}
