//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod aggregation;
mod assignments;
mod grades;
mod groups;
mod submissions;
mod transaction;
mod users;

pub use transaction::SeaOrmTransaction;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{GroupworkError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DbBackend, DbErr, IsolationLevel,
    SqliteTransactionMode, TransactionOptions, TransactionTrait,
};
use std::time::Duration;
use tracing::{debug, info};

/// 并发写入导致的可重试失败（SQLite 忙/锁、PostgreSQL/MySQL 串行化失败与死锁）
const CONFLICT_MARKERS: &[&str] = &[
    "database is locked",
    "database table is locked",
    "sqlite_busy",
    "could not serialize access",
    "deadlock",
    "try restarting transaction",
];

/// 将 [`DbErr`] 归类为事务冲突或存储故障
pub(crate) fn db_error(context: &str, err: DbErr) -> GroupworkError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if CONFLICT_MARKERS.iter().any(|m| lowered.contains(m)) {
        debug!("{} hit a transaction conflict: {}", context, message);
        GroupworkError::transaction_conflict(format!("{context}: {message}"))
    } else {
        GroupworkError::store_failure(format!("{context}: {message}"))
    }
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 使用全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        Self::from_config(&AppConfig::get().database).await
    }

    /// 按给定数据库配置连接并运行迁移
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| GroupworkError::store_failure(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GroupworkError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size.max(1))
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| GroupworkError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| GroupworkError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(GroupworkError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 写事务选项
    ///
    /// SQLite 使用 `BEGIN IMMEDIATE`：先读后写的延迟事务在升级写锁时会直接得到 BUSY，
    /// 立即取得写锁后其余写事务在 busy_timeout 内排队等待。
    /// 其余后端要求 SERIALIZABLE，串行化失败归类为事务冲突交由上层重试。
    fn transaction_options(backend: DbBackend) -> TransactionOptions {
        if backend == DbBackend::Sqlite {
            TransactionOptions {
                sqlite_transaction_mode: Some(SqliteTransactionMode::Immediate),
                ..Default::default()
            }
        } else {
            TransactionOptions {
                isolation_level: Some(IsolationLevel::Serializable),
                ..Default::default()
            }
        }
    }

    async fn begin_transaction(&self) -> Result<SeaOrmTransaction> {
        let options = Self::transaction_options(self.db.get_database_backend());
        let tx = self
            .db
            .begin_with_options(options)
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        Ok(SeaOrmTransaction::new(tx))
    }
}

// Storage trait 实现
use crate::models::{
    assignments::entities::{Assignment, AssignmentStatus, Group},
    class_status::entities::Participation,
    grades::entities::{Grade, GradeRecord},
    submissions::entities::Submission,
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::{Storage, StorageTransaction};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        users::create_user(&self.db, user).await
    }

    async fn count_users(&self) -> Result<u64> {
        users::count_users(&self.db).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        users::get_user_by_id(&self.db, id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        users::get_user_by_username(&self.db, username).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        users::get_users_by_ids(&self.db, ids).await
    }

    async fn list_students(&self) -> Result<Vec<User>> {
        users::list_students(&self.db).await
    }

    // 任务模块
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        assignments::get_assignment_by_id(&self.db, id).await
    }

    async fn list_assignments_by_teacher(
        &self,
        teacher_id: i64,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<Assignment>> {
        assignments::list_assignments_by_teacher(&self.db, teacher_id, status).await
    }

    async fn list_open_assignments_for_student(&self, student_id: i64) -> Result<Vec<Assignment>> {
        assignments::list_open_assignments_for_student(&self.db, student_id).await
    }

    // 小组模块
    async fn get_group_by_id(&self, group_id: i64) -> Result<Option<Group>> {
        groups::get_group_by_id(&self.db, group_id).await
    }

    async fn list_groups_by_assignment(&self, assignment_id: i64) -> Result<Vec<Group>> {
        groups::list_groups_by_assignment(&self.db, assignment_id).await
    }

    async fn list_group_members(&self, group_id: i64) -> Result<Vec<User>> {
        groups::list_group_members(&self.db, group_id).await
    }

    async fn get_student_group(
        &self,
        student_id: i64,
        assignment_id: i64,
    ) -> Result<Option<Group>> {
        groups::get_student_group(&self.db, student_id, assignment_id).await
    }

    // 回答与评分模块
    async fn get_submission_by_group(&self, group_id: i64) -> Result<Option<Submission>> {
        submissions::get_submission_by_group(&self.db, group_id).await
    }

    async fn get_grade_by_assignment_and_group(
        &self,
        assignment_id: i64,
        group_id: i64,
    ) -> Result<Option<Grade>> {
        grades::get_grade_by_assignment_and_group(&self.db, assignment_id, group_id).await
    }

    // 聚合模块
    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<GradeRecord>> {
        aggregation::list_student_grades(&self.db, student_id).await
    }

    async fn list_teacher_participations(&self, teacher_id: i64) -> Result<Vec<Participation>> {
        aggregation::list_teacher_participations(&self.db, teacher_id).await
    }

    async fn begin(&self) -> Result<Box<dyn StorageTransaction>> {
        Ok(Box::new(self.begin_transaction().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("groupwork.db").unwrap(),
            "sqlite://groupwork.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").unwrap(),
            "postgres://u:p@localhost/db"
        );
        assert!(SeaOrmStorage::build_database_url("redis://localhost").is_err());
    }

    #[test]
    fn test_sqlite_transactions_take_the_write_lock_up_front() {
        let sqlite = SeaOrmStorage::transaction_options(DbBackend::Sqlite);
        assert_eq!(
            sqlite.sqlite_transaction_mode,
            Some(SqliteTransactionMode::Immediate)
        );
        assert_eq!(sqlite.isolation_level, None);

        let postgres = SeaOrmStorage::transaction_options(DbBackend::Postgres);
        assert_eq!(postgres.isolation_level, Some(IsolationLevel::Serializable));
        assert_eq!(postgres.sqlite_transaction_mode, None);
    }

    #[test]
    fn test_busy_and_serialization_errors_are_conflicts() {
        for message in [
            "error returned from database: (code: 5) database is locked",
            "error returned from database: could not serialize access due to concurrent update",
            "Deadlock found when trying to get lock; try restarting transaction",
        ] {
            let err = db_error("提交事务失败", DbErr::Custom(message.to_string()));
            assert!(err.is_retryable(), "{message}");
        }

        let err = db_error("创建用户失败", DbErr::Custom("no such table: users".to_string()));
        assert!(matches!(err, GroupworkError::StoreFailure(_)));
        assert!(err.message().starts_with("创建用户失败"));
    }
}
