use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 生产环境禁止使用的示例密钥
const PLACEHOLDER_SECRET: &str = "change-me-in-production";

/// 常用环境变量到配置键的映射，优先级高于 `GROUPWORK_*`
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("APP_ENV", "app.environment"),
    ("RUST_LOG", "app.log_level"),
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("UNIX_SOCKET", "server.unix_socket_path"),
    ("CPU_COUNT", "server.workers"),
    ("JWT_SECRET", "jwt.secret"),
    ("DATABASE_URL", "database.url"),
    ("SEED_FILE", "seed.users_file"),
];

impl AppConfig {
    /// 依次合并 `config.toml`、`config.{APP_ENV}.toml`、`GROUPWORK_*` 与常用环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{env}")).required(false))
            .add_source(
                Environment::with_prefix("GROUPWORK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get();
        }
        app_config.validate()?;

        Ok(app_config)
    }

    /// 拒绝无法正常运行的组合
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.pool_size == 0 {
            return Err(ConfigError::Message(
                "database.pool_size must be at least 1".to_string(),
            ));
        }
        if self.jwt.access_token_minutes <= 0 || self.jwt.refresh_token_days <= 0 {
            return Err(ConfigError::Message(
                "jwt token lifetimes must be positive".to_string(),
            ));
        }
        if self.rate_limit.login_per_minute == 0
            || self.rate_limit.refresh_per_minute == 0
            || self.rate_limit.failed_logins == 0
        {
            return Err(ConfigError::Message(
                "rate_limit values must be at least 1".to_string(),
            ));
        }
        if self.is_production()
            && (self.jwt.secret.is_empty() || self.jwt.secret == PLACEHOLDER_SECRET)
        {
            return Err(ConfigError::Message(
                "jwt.secret must be set to a real secret in production".to_string(),
            ));
        }
        Ok(())
    }

    /// 全局配置；首次访问时加载，失败即退出进程
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        Some(self.server.unix_socket_path.as_str()).filter(|p| !p.is_empty())
    }
}
