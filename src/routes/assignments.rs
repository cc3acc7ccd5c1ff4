use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;

use crate::middlewares::{self, RequireRole};
use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::models::grades::{requests::GradeAssignmentRequest, responses::GradeResponse};
use crate::models::submissions::{entities::SubmitOutcome, requests::SubmitResponseRequest};
use crate::models::users::entities::UserRole;
use crate::services::{AssignmentService, GradingService, SubmissionService};
use crate::storage::Storage;

use super::{current_user, error_response, respond};

// 创建任务
pub async fn create_assignment(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let result = AssignmentService::new(storage.get_ref().clone())
        .create_assignment(user.id, body.into_inner())
        .await;
    respond(result, StatusCode::CREATED, "Assignment created successfully")
}

// 列出开放任务（教师看自己创建的，学生看所在小组的）
pub async fn list_open_assignments(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let result = AssignmentService::new(storage.get_ref().clone())
        .list_open_assignments(&user)
        .await;
    respond(result, StatusCode::OK, "Open assignments retrieved successfully")
}

// 教师查看任务下各小组的回答
pub async fn list_responses(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let result = AssignmentService::new(storage.get_ref().clone())
        .teacher_responses(user.id, path.into_inner())
        .await;
    respond(result, StatusCode::OK, "Responses retrieved successfully")
}

// 评分
pub async fn grade_assignment(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
    path: web::Path<i64>,
    body: web::Json<GradeAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let body = body.into_inner();

    let result = GradingService::new(storage.get_ref().clone())
        .grade_assignment(user.id, path.into_inner(), body.group_id, body.score)
        .await
        .map(|grade| GradeResponse { grade });
    respond(result, StatusCode::OK, "Assignment graded and closed")
}

// 学生查看本组回答
pub async fn get_own_response(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let result = AssignmentService::new(storage.get_ref().clone())
        .student_response(user.id, path.into_inner())
        .await;
    respond(result, StatusCode::OK, "Response retrieved successfully")
}

// 学生提交或更新本组回答
pub async fn submit_response(
    req: HttpRequest,
    storage: web::Data<Arc<dyn Storage>>,
    path: web::Path<i64>,
    body: web::Json<SubmitResponseRequest>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    match SubmissionService::new(storage.get_ref().clone())
        .submit_response(user.id, path.into_inner(), &body.content)
        .await
    {
        Ok(result) => {
            let (status, message) = match result.outcome {
                SubmitOutcome::Created => (StatusCode::CREATED, "Response submitted"),
                SubmitOutcome::Updated => (StatusCode::OK, "Response updated"),
            };
            respond(Ok(result), status, message)
        }
        Err(e) => Ok(error_response(&e)),
    }
}

// 配置路由
pub fn configure_assignments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            // 创建任务 - 仅教师
            .service(
                web::resource("").route(
                    web::post()
                        .to(create_assignment)
                        .wrap(RequireRole::new(UserRole::Teacher)),
                ),
            )
            // 开放任务 - 教师与学生，业务层按角色过滤
            .service(web::resource("/open").route(web::get().to(list_open_assignments)))
            .service(
                web::resource("/{id}/responses")
                    .route(web::get().to(list_responses))
                    .wrap(RequireRole::new(UserRole::Teacher)),
            )
            .service(
                web::resource("/{id}/grade")
                    .route(web::post().to(grade_assignment))
                    .wrap(RequireRole::new(UserRole::Teacher)),
            )
            .service(
                web::resource("/{id}/response")
                    .route(web::get().to(get_own_response))
                    .route(web::put().to(submit_response))
                    .wrap(RequireRole::new(UserRole::Student)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let app = test::init_service(App::new().configure(configure_assignments_routes)).await;

        for req in [
            test::TestRequest::get().uri("/api/v1/assignments/open"),
            test::TestRequest::post().uri("/api/v1/assignments/1/grade"),
            test::TestRequest::put()
                .uri("/api/v1/assignments/1/response")
                .insert_header(("Authorization", "Basic abc")),
        ] {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
