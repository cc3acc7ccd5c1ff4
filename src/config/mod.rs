//! 配置管理
//!
//! 静态配置来自 `config.toml`、`config.{APP_ENV}.toml` 以及环境变量。

#[path = "impl.rs"]
mod loader;
mod structs;

pub use structs::*;
