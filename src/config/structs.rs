use serde::{Deserialize, Serialize};

/// 应用配置；所有字段都有默认值，缺失的配置文件不会导致启动失败
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub environment: String,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 非空时改为监听 Unix 套接字
    pub unix_socket_path: String,
    /// 0 表示按 CPU 核数
    pub workers: usize,
    pub keep_alive_secs: u64,
    pub request_timeout_ms: u64,
    pub disconnect_timeout_ms: u64,
    pub max_payload_bytes: usize,
    pub cors_max_age: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            unix_socket_path: String::new(),
            workers: 0,
            keep_alive_secs: 30,
            request_timeout_ms: 5000,
            disconnect_timeout_ms: 1000,
            max_payload_bytes: 64 * 1024,
            cors_max_age: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        }
    }
}

/// 数据库配置；`url` 的类型由 scheme 或文件后缀推断
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    /// 连接与获取连接的超时（秒）
    pub timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "groupwork.db".to_string(),
            pool_size: 8,
            timeout: 5,
        }
    }
}

/// 令牌到用户的身份缓存
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub identity_ttl_secs: u64,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            identity_ttl_secs: 300,
            max_entries: 10_000,
        }
    }
}

/// 认证端点限流
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// 每个 IP 每分钟的登录请求数
    pub login_per_minute: u32,
    /// 每个 IP 每分钟的刷新请求数
    pub refresh_per_minute: u32,
    /// 单个用户名在窗口内允许的失败登录次数
    pub failed_logins: u32,
    pub failed_login_window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_per_minute: 5,
            refresh_per_minute: 10,
            failed_logins: 5,
            failed_login_window_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// 用户种子文件（JSON 数组），仅在用户表为空时导入
    pub users_file: String,
}
