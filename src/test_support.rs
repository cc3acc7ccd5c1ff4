//! 服务层测试共用的存储与数据
//!
//! [`setup`] 使用单连接的内存 SQLite，适合顺序流程；
//! [`setup_shared`] 使用临时目录中的数据库文件与多连接池，供并发测试使用。

use std::sync::Arc;

use tempfile::TempDir;

use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::models::assignments::{
    requests::CreateAssignmentRequest, responses::CreatedAssignmentResponse,
};
use crate::models::grades::entities::Grade;
use crate::models::users::{
    entities::{User, UserRole},
    requests::CreateUserRequest,
};
use crate::services::{AssignmentService, GradingService, SubmissionService};
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

/// 未用于登录的测试用户共用的占位哈希
pub const PLACEHOLDER_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$placeholder";

pub struct TestContext {
    pub storage: Arc<dyn Storage>,
    pub teacher: User,
    pub other_teacher: User,
    pub students: Vec<User>,
    // 文件数据库所在目录，随上下文一起删除
    _db_dir: Option<TempDir>,
}

impl TestContext {
    pub fn student(&self, index: usize) -> &User {
        &self.students[index]
    }

    pub fn student_ids(&self, indexes: &[usize]) -> Vec<i64> {
        indexes.iter().map(|&i| self.students[i].id).collect()
    }

    pub fn assignments(&self) -> AssignmentService {
        AssignmentService::new(self.storage.clone())
    }

    pub fn submissions(&self) -> SubmissionService {
        SubmissionService::new(self.storage.clone())
    }

    pub fn grading(&self) -> GradingService {
        GradingService::new(self.storage.clone())
    }

    /// 以指定教师创建任务，成员按学生下标给出
    pub async fn create(
        &self,
        teacher: &User,
        indexes: &[usize],
    ) -> Result<CreatedAssignmentResponse> {
        self.assignments()
            .create_assignment(
                teacher.id,
                CreateAssignmentRequest {
                    title: format!("Compito {}", indexes.len()),
                    description: String::new(),
                    student_ids: self.student_ids(indexes),
                },
            )
            .await
    }

    /// 创建任务、由第一名成员提交回答并评分
    pub async fn create_graded(&self, teacher: &User, indexes: &[usize], score: i32) -> Grade {
        let created = self
            .create(teacher, indexes)
            .await
            .expect("assignment should be created");
        self.submissions()
            .submit_response(
                self.student(indexes[0]).id,
                created.assignment.id,
                "la nostra risposta",
            )
            .await
            .expect("response should be submitted");
        self.grading()
            .grade_assignment(
                teacher.id,
                created.assignment.id,
                created.group_id,
                f64::from(score),
            )
            .await
            .expect("assignment should be graded")
    }
}

async fn open_storage(url: String, pool_size: u32) -> Arc<dyn Storage> {
    let storage = SeaOrmStorage::from_config(&DatabaseConfig {
        url,
        pool_size,
        timeout: 10,
    })
    .await
    .expect("test storage should initialize");
    Arc::new(storage)
}

/// 单连接的内存 SQLite（每个连接都是独立的内存数据库）
pub async fn memory_storage() -> Arc<dyn Storage> {
    open_storage("sqlite::memory:".to_string(), 1).await
}

/// 临时目录中的 SQLite 文件，连接池大小与默认配置一致
pub async fn file_storage() -> (TempDir, Arc<dyn Storage>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("groupwork.db").display());
    let storage = open_storage(url, 8).await;
    (dir, storage)
}

pub async fn create_user(
    storage: &dyn Storage,
    username: &str,
    role: UserRole,
    display_name: Option<&str>,
    password_hash: &str,
) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@scuola.test"),
            password: password_hash.to_string(),
            role,
            display_name: display_name.map(str::to_string),
        })
        .await
        .expect("user should be created")
}

/// 两名教师与六名学生；学生 ID 按下标递增
async fn populate(storage: Arc<dyn Storage>, db_dir: Option<TempDir>) -> TestContext {
    let teacher = create_user(
        storage.as_ref(),
        "rossi",
        UserRole::Teacher,
        Some("Prof. Rossi"),
        PLACEHOLDER_HASH,
    )
    .await;
    let other_teacher = create_user(
        storage.as_ref(),
        "bianchi",
        UserRole::Teacher,
        Some("Prof. Bianchi"),
        PLACEHOLDER_HASH,
    )
    .await;

    let mut students = Vec::new();
    for (username, display_name) in [
        ("zoe", "Zoe"),
        ("marco", "Marco"),
        ("anna", "anna"),
        ("luca", "Luca"),
        ("bea", "Bea"),
        ("fabio", "Fabio"),
    ] {
        students.push(
            create_user(
                storage.as_ref(),
                username,
                UserRole::Student,
                Some(display_name),
                PLACEHOLDER_HASH,
            )
            .await,
        );
    }

    TestContext {
        storage,
        teacher,
        other_teacher,
        students,
        _db_dir: db_dir,
    }
}

pub async fn setup() -> TestContext {
    populate(memory_storage().await, None).await
}

/// 多连接文件数据库上的同一组数据，写事务真正并发执行
pub async fn setup_shared() -> TestContext {
    let (dir, storage) = file_storage().await;
    populate(storage, Some(dir)).await
}
