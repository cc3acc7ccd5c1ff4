use crate::cache::{MokaCacheWrapper, ObjectCache};
use crate::config::AppConfig;
use crate::errors::{GroupworkError, Result};
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例
fn create_cache() -> Arc<dyn ObjectCache> {
    let config = AppConfig::get();
    Arc::new(MokaCacheWrapper::new(&config.cache))
}

/// 读取用户种子文件（JSON 数组，密码为明文）
pub fn load_seed_users(path: &Path) -> Result<Vec<CreateUserRequest>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        GroupworkError::database_config(format!(
            "Failed to read seed file {}: {e}",
            path.display()
        ))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// 导入初始用户
/// 仅当数据库中没有任何用户时执行，返回创建的用户数量
pub async fn seed_users(storage: &dyn Storage, users: Vec<CreateUserRequest>) -> Result<usize> {
    let count = storage.count_users().await?;
    if count > 0 {
        debug!(
            "Database already has {} user(s), skipping user seed",
            count
        );
        return Ok(0);
    }

    info!("No users found in database, seeding {} user(s)...", users.len());

    let mut created = 0;
    for mut request in users {
        request.password = hash_password(&request.password)?;
        let user = storage.create_user(request).await?;
        debug!("Seeded user {} ({}) as {}", user.username, user.id, user.role);
        created += 1;
    }

    Ok(created)
}

async fn seed_from_config(storage: &dyn Storage) {
    let seed_file = &AppConfig::get().seed.users_file;
    if seed_file.is_empty() {
        debug!("No seed file configured");
        return;
    }

    let path = Path::new(seed_file);
    if !path.exists() {
        warn!("Seed file {} not found, skipping user seed", seed_file);
        return;
    }

    let result = match load_seed_users(path) {
        Ok(users) => seed_users(storage, users).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(0) => {}
        Ok(created) => info!("Seeded {} user(s) from {}", created, seed_file),
        Err(e) => warn!("Failed to seed users from {}: {}", seed_file, e),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、初始用户和缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    // 初始化用户（如果需要）
    seed_from_config(storage.as_ref()).await;

    let cache = create_cache();
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::test_support::memory_storage;

    #[tokio::test]
    async fn seed_file_is_imported_only_into_an_empty_store() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("seed_users.json");
        let users = load_seed_users(&path).expect("seed file parses");
        assert!(users.iter().any(|u| u.role == UserRole::Teacher));
        assert!(users.iter().any(|u| u.role == UserRole::Student));

        let storage = memory_storage().await;
        let subset: Vec<_> = users.into_iter().take(2).collect();
        let first_username = subset[0].username.clone();

        let created = seed_users(storage.as_ref(), subset.clone())
            .await
            .expect("seed");
        assert_eq!(created, 2);
        assert_eq!(storage.count_users().await.expect("count"), 2);

        // 密码以哈希形式保存
        let stored = storage
            .get_user_by_username(&first_username)
            .await
            .expect("lookup")
            .expect("seeded user exists");
        assert!(stored.password_hash.starts_with("$argon2"));

        let again = seed_users(storage.as_ref(), subset).await.expect("seed");
        assert_eq!(again, 0);
    }

    #[test]
    fn missing_seed_file_is_a_config_error() {
        let err = load_seed_users(Path::new("/nonexistent/seed.json"))
            .err()
            .expect("missing file should fail");
        assert!(matches!(err, GroupworkError::DatabaseConfig(_)));
    }
}
