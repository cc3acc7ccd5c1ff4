use actix_web::{HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;

use crate::middlewares::{self, RequireRole};
use crate::models::users::entities::UserRole;
use crate::services::UserService;
use crate::storage::Storage;

use super::respond;

// 学生目录
pub async fn list_students(storage: web::Data<Arc<dyn Storage>>) -> ActixResult<HttpResponse> {
    let result = UserService::new(storage.get_ref().clone())
        .list_students()
        .await;
    respond(result, StatusCode::OK, "Students retrieved successfully")
}

// 配置路由
pub fn configure_students_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_students))
                    .wrap(RequireRole::new(UserRole::Teacher)),
            ),
    );
}
