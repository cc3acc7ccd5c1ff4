use actix_web::{HttpResponse, Result as ActixResult};
use once_cell::sync::Lazy;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::{GroupworkError, Result};
use crate::middlewares::rate_limit::{Admission, AttemptWindow, too_many_requests};
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
    users::entities::User,
};
use crate::storage::Storage;
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

/// 按用户名统计的失败登录次数，与按 IP 的请求限流互补
static FAILED_LOGINS: Lazy<AttemptWindow> = Lazy::new(|| {
    let limits = &AppConfig::get().rate_limit;
    AttemptWindow::new(
        limits.failed_logins,
        Duration::from_secs(limits.failed_login_window_secs),
    )
});

fn failed_login_key(username: &str) -> String {
    format!("user:{}", username.trim().to_lowercase())
}

/// 按用户名与密码查找用户
pub async fn verify_credentials(
    storage: &dyn Storage,
    username: &str,
    password: &str,
) -> Result<User> {
    match storage.get_user_by_username(username.trim()).await? {
        Some(user) if verify_password(password, &user.password_hash) => Ok(user),
        _ => Err(GroupworkError::authentication(
            "Username or password is incorrect",
        )),
    }
}

/// 一次登录尝试的结果
#[derive(Debug)]
pub enum LoginAttempt {
    Accepted(User),
    Rejected(String),
    Throttled { retry_after: u64 },
}

/// 在失败计数窗口内校验凭据；失败计一次，成功清零
pub async fn attempt_login(
    failures: &AttemptWindow,
    storage: &dyn Storage,
    username: &str,
    password: &str,
) -> Result<LoginAttempt> {
    let key = failed_login_key(username);

    if let Admission::Limited { retry_after } = failures.check(&key).await {
        warn!("Login for {} rejected: too many failed attempts", username);
        return Ok(LoginAttempt::Throttled { retry_after });
    }

    match verify_credentials(storage, username, password).await {
        Ok(user) => {
            failures.clear(&key).await;
            Ok(LoginAttempt::Accepted(user))
        }
        Err(GroupworkError::Authentication(msg)) => {
            failures.hit(&key).await;
            warn!("Login failed for {}", username);
            Ok(LoginAttempt::Rejected(msg))
        }
        Err(e) => Err(e),
    }
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let attempt = attempt_login(
        &FAILED_LOGINS,
        service.storage.as_ref(),
        &login_request.username,
        &login_request.password,
    )
    .await;

    let user = match attempt {
        Ok(LoginAttempt::Accepted(user)) => user,
        Ok(LoginAttempt::Throttled { retry_after }) => return Ok(too_many_requests(retry_after)),
        Ok(LoginAttempt::Rejected(msg)) => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::AuthFailed, msg)));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Login failed: {e}"),
                )),
            );
        }
    };

    match user.generate_token_pair() {
        Ok(token_pair) => {
            info!("User {} logged in successfully", user.username);

            let refresh_cookie = jwt::JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token);
            let response = LoginResponse {
                access_token: token_pair.access_token,
                expires_in: config.jwt.access_token_minutes * 60, // 转换为秒
                user,
            };

            Ok(HttpResponse::Ok()
                .cookie(refresh_cookie)
                .json(ApiResponse::success(response, "Login successful")))
        }
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::test_support::{create_user, memory_storage};
    use crate::utils::password::hash_password;

    #[tokio::test]
    async fn credentials_are_checked_against_the_stored_hash() {
        let storage = memory_storage().await;
        let hash = hash_password("Student123").expect("hash");
        let alice = create_user(
            storage.as_ref(),
            "alice",
            UserRole::Student,
            Some("Alice"),
            &hash,
        )
        .await;

        let found = verify_credentials(storage.as_ref(), "alice", "Student123")
            .await
            .expect("valid credentials");
        assert_eq!(found.id, alice.id);
        assert_eq!(found.role, UserRole::Student);

        assert!(matches!(
            verify_credentials(storage.as_ref(), "alice", "student123").await,
            Err(GroupworkError::Authentication(_))
        ));
        assert!(matches!(
            verify_credentials(storage.as_ref(), "nobody", "Student123").await,
            Err(GroupworkError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn repeated_failures_lock_the_username() {
        let storage = memory_storage().await;
        let hash = hash_password("Teacher123").expect("hash");
        create_user(storage.as_ref(), "rossi", UserRole::Teacher, None, &hash).await;
        let failures = AttemptWindow::new(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert!(matches!(
                attempt_login(&failures, storage.as_ref(), "rossi", "sbagliata").await,
                Ok(LoginAttempt::Rejected(_))
            ));
        }

        // 达到上限后正确密码也被拒绝，大小写不同的用户名计入同一键
        assert!(matches!(
            attempt_login(&failures, storage.as_ref(), " Rossi ", "Teacher123").await,
            Ok(LoginAttempt::Throttled { retry_after }) if retry_after >= 1
        ));

        failures.clear(&failed_login_key("rossi")).await;
        assert!(matches!(
            attempt_login(&failures, storage.as_ref(), "rossi", "Teacher123").await,
            Ok(LoginAttempt::Accepted(user)) if user.username == "rossi"
        ));
    }

    #[tokio::test]
    async fn success_resets_the_failure_count() {
        let storage = memory_storage().await;
        let hash = hash_password("Student123").expect("hash");
        create_user(storage.as_ref(), "zoe", UserRole::Student, None, &hash).await;
        let failures = AttemptWindow::new(2, Duration::from_secs(60));

        attempt_login(&failures, storage.as_ref(), "zoe", "x").await.expect("attempt");
        attempt_login(&failures, storage.as_ref(), "zoe", "Student123")
            .await
            .expect("attempt");
        assert_eq!(
            failures.check(&failed_login_key("zoe")).await,
            Admission::Allowed { remaining: 2 }
        );
    }
}
