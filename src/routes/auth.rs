use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::{self, RateLimit};
use crate::models::auth::LoginRequest;
use crate::services::AuthService;
use crate::storage::Storage;

pub async fn login(
    storage: web::Data<Arc<dyn Storage>>,
    user_data: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    AuthService::new(storage.get_ref().clone())
        .login(user_data.into_inner())
        .await
}

pub async fn refresh_token(
    storage: web::Data<Arc<dyn Storage>>,
    request: HttpRequest,
) -> ActixResult<HttpResponse> {
    AuthService::new(storage.get_ref().clone())
        .refresh_token(&request)
        .await
}

pub async fn logout(
    storage: web::Data<Arc<dyn Storage>>,
    cache: web::Data<Arc<dyn ObjectCache>>,
    request: HttpRequest,
) -> ActixResult<HttpResponse> {
    AuthService::new(storage.get_ref().clone())
        .logout(&request, cache.get_ref().clone())
        .await
}

pub async fn get_user(
    storage: web::Data<Arc<dyn Storage>>,
    request: HttpRequest,
) -> ActixResult<HttpResponse> {
    AuthService::new(storage.get_ref().clone())
        .get_user(&request)
        .await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .service(
                web::resource("/login")
                    .wrap(RateLimit::login())
                    .route(web::post().to(login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(RateLimit::refresh_token())
                    .route(web::post().to(refresh_token)),
            )
            .route("/logout", web::post().to(logout))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route("/me", web::get().to(get_user)),
            ),
    );
}
