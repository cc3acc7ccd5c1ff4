//! 认证端点限流
//!
//! [`AttemptWindow`] 是基于 moka 的固定窗口计数器，按键统计窗口内的次数。
//! [`RateLimit`] 中间件按客户端 IP 计数，用于登录与刷新令牌；
//! 登录服务另用一个窗口按用户名统计失败次数。
//!
//! ```rust,ignore
//! web::resource("/login")
//!     .wrap(RateLimit::login())
//!     .route(web::post().to(login))
//! ```

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode};

const WINDOW_CAPACITY: u64 = 100_000;

static LOGIN_WINDOW: Lazy<AttemptWindow> = Lazy::new(|| {
    AttemptWindow::per_minute(AppConfig::get().rate_limit.login_per_minute)
});

static REFRESH_WINDOW: Lazy<AttemptWindow> = Lazy::new(|| {
    AttemptWindow::per_minute(AppConfig::get().rate_limit.refresh_per_minute)
});

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// 一次计数或查询的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32 },
    /// `retry_after` 为窗口剩余秒数，至少为 1
    Limited { retry_after: u64 },
}

/// 固定窗口计数器；窗口从某个键的第一次计数开始，到期后重新计数
pub struct AttemptWindow {
    counts: Cache<String, Window>,
    max_attempts: u32,
    window: Duration,
}

impl AttemptWindow {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            counts: Cache::builder()
                .max_capacity(WINDOW_CAPACITY)
                .time_to_live(window)
                .build(),
            max_attempts,
            window,
        }
    }

    pub fn per_minute(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::from_secs(60))
    }

    fn retry_after(&self, started: Instant, now: Instant) -> u64 {
        let left = self.window.saturating_sub(now.duration_since(started));
        left.as_secs_f64().ceil().max(1.0) as u64
    }

    /// 计一次并返回是否仍在限额内；同一键的并发计数由 moka 串行化
    pub async fn hit(&self, key: &str) -> Admission {
        let now = Instant::now();
        let window = self.window;
        let current = self
            .counts
            .entry(key.to_string())
            .and_upsert_with(|existing| {
                let next = match existing.map(|e| e.into_value()) {
                    Some(w) if now.duration_since(w.started) < window => Window {
                        started: w.started,
                        count: w.count.saturating_add(1),
                    },
                    _ => Window {
                        started: now,
                        count: 1,
                    },
                };
                std::future::ready(next)
            })
            .await
            .into_value();

        if current.count > self.max_attempts {
            Admission::Limited {
                retry_after: self.retry_after(current.started, now),
            }
        } else {
            Admission::Allowed {
                remaining: self.max_attempts - current.count,
            }
        }
    }

    /// 只查询不计数；`max_attempts` 次用尽后即为 Limited
    pub async fn check(&self, key: &str) -> Admission {
        let now = Instant::now();
        let current = self
            .counts
            .get(key)
            .await
            .filter(|w| now.duration_since(w.started) < self.window);

        match current {
            Some(w) if w.count >= self.max_attempts => Admission::Limited {
                retry_after: self.retry_after(w.started, now),
            },
            Some(w) => Admission::Allowed {
                remaining: self.max_attempts - w.count,
            },
            None => Admission::Allowed {
                remaining: self.max_attempts,
            },
        }
    }

    pub async fn clear(&self, key: &str) {
        self.counts.invalidate(key).await;
    }
}

/// 按客户端 IP 限流的中间件
#[derive(Clone)]
pub struct RateLimit {
    window: &'static AttemptWindow,
    key_prefix: &'static str,
}

impl RateLimit {
    pub fn new(window: &'static AttemptWindow, key_prefix: &'static str) -> Self {
        Self { window, key_prefix }
    }

    pub fn login() -> Self {
        Self::new(&LOGIN_WINDOW, "login")
    }

    pub fn refresh_token() -> Self {
        Self::new(&REFRESH_WINDOW, "refresh")
    }
}

/// 客户端 IP；`realip_remote_addr` 已处理 Forwarded / X-Forwarded-For，
/// 直连时返回的是带端口的对端地址
fn client_ip(req: &ServiceRequest) -> String {
    let info = req.connection_info();
    let Some(addr) = info.realip_remote_addr() else {
        return "unknown".to_string();
    };
    parse_ip(addr)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| addr.to_string())
}

fn parse_ip(addr: &str) -> Option<IpAddr> {
    addr.parse::<IpAddr>()
        .ok()
        .or_else(|| addr.parse::<SocketAddr>().ok().map(|s| s.ip()))
}

pub(crate) fn too_many_requests(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            let key = format!("{}:{}", limit.key_prefix, client_ip(&req));

            if let Admission::Limited { retry_after } = limit.window.hit(&key).await {
                warn!("Rate limit exceeded for {}", key);
                return Ok(req.into_response(too_many_requests(retry_after).map_into_right_body()));
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};

    #[tokio::test]
    async fn test_window_limits_after_max_attempts() {
        let window = AttemptWindow::per_minute(2);
        assert_eq!(window.hit("a").await, Admission::Allowed { remaining: 1 });
        assert_eq!(window.hit("a").await, Admission::Allowed { remaining: 0 });
        assert!(matches!(
            window.hit("a").await,
            Admission::Limited { retry_after } if (1..=60).contains(&retry_after)
        ));

        // 其他键不受影响
        assert_eq!(window.hit("b").await, Admission::Allowed { remaining: 1 });
    }

    #[tokio::test]
    async fn test_check_does_not_count() {
        let window = AttemptWindow::per_minute(2);
        assert_eq!(window.check("k").await, Admission::Allowed { remaining: 2 });
        window.hit("k").await;
        assert_eq!(window.check("k").await, Admission::Allowed { remaining: 1 });
        window.hit("k").await;
        assert!(matches!(window.check("k").await, Admission::Limited { .. }));

        window.clear("k").await;
        assert_eq!(window.check("k").await, Admission::Allowed { remaining: 2 });
    }

    #[tokio::test]
    async fn test_window_restarts_after_expiry() {
        let window = AttemptWindow::new(1, Duration::from_millis(50));
        window.hit("k").await;
        assert!(matches!(window.hit("k").await, Admission::Limited { .. }));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(window.hit("k").await, Admission::Allowed { remaining: 0 });
    }

    #[::core::prelude::v1::test]
    fn test_parse_ip_strips_port() {
        assert_eq!(parse_ip("10.1.2.3:5555"), "10.1.2.3".parse().ok());
        assert_eq!(parse_ip("[::1]:8080"), "::1".parse().ok());
        assert_eq!(parse_ip("192.168.0.9"), "192.168.0.9".parse().ok());
        assert_eq!(parse_ip("not-an-ip"), None);
    }

    static TEST_WINDOW: Lazy<AttemptWindow> = Lazy::new(|| AttemptWindow::per_minute(2));

    #[actix_web::test]
    async fn test_middleware_limits_per_client_ip() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(&TEST_WINDOW, "test"))
                .route("/", web::post().to(HttpResponse::Ok)),
        )
        .await;

        let from = |addr: &str| {
            test::TestRequest::post()
                .uri("/")
                .peer_addr(addr.parse().unwrap())
                .to_request()
        };

        for _ in 0..2 {
            let resp = test::call_service(&app, from("10.0.0.1:4000")).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        // 同一 IP 换端口仍计入同一窗口
        let resp = test::call_service(&app, from("10.0.0.1:4001")).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("Retry-After"));

        let resp = test::call_service(&app, from("10.0.0.2:4000")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
