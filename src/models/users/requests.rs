use serde::Deserialize;

use super::entities::UserRole;

// 创建用户请求（password 字段在进入存储层前已被哈希）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub display_name: Option<String>,
}
