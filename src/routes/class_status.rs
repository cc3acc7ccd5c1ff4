use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;

use crate::middlewares::{self, RequireRole};
use crate::models::class_status::requests::ClassStatusQuery;
use crate::models::users::entities::UserRole;
use crate::services::ClassStatusService;
use crate::storage::Storage;

use super::{current_user, respond};

// 班级状态
pub async fn get_class_status(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
    query: web::Query<ClassStatusQuery>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let result = ClassStatusService::new(storage.get_ref().clone())
        .status_for(user.id, query.into_inner().order)
        .await;
    respond(result, StatusCode::OK, "Class status retrieved successfully")
}

// 配置路由
pub fn configure_class_status_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/class")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/status")
                    .route(web::get().to(get_class_status))
                    .wrap(RequireRole::new(UserRole::Teacher)),
            ),
    );
}
