use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;

use crate::middlewares;
use crate::services::GroupService;
use crate::storage::Storage;

use super::{current_user, respond};

// 小组成员（任务所属教师或组员可见，权限在业务层检查）
pub async fn list_members(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let result = GroupService::new(storage.get_ref().clone())
        .members_of(&user, path.into_inner())
        .await;
    respond(result, StatusCode::OK, "Group members retrieved successfully")
}

// 配置路由
pub fn configure_groups_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/groups")
            .wrap(middlewares::RequireJWT)
            .route("/{id}/members", web::get().to(list_members)),
    );
}
