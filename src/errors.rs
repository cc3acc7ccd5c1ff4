//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 业务层只返回结构化的错误值，由请求层决定如何呈现。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_groupwork_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum GroupworkError {
            $($variant(String),)*
        }

        impl GroupworkError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(GroupworkError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(GroupworkError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(GroupworkError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl GroupworkError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        GroupworkError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_groupwork_errors! {
    Validation("E001", "Validation Error"),
    ConstraintViolation("E002", "Constraint Violation"),
    Forbidden("E003", "Forbidden"),
    NotFound("E004", "Resource Not Found"),
    InvalidState("E005", "Invalid State"),
    StoreFailure("E006", "Store Failure"),
    DatabaseConfig("E007", "Database Configuration Error"),
    DatabaseConnection("E008", "Database Connection Error"),
    Authentication("E009", "Authentication Error"),
    Serialization("E010", "Serialization Error"),
    TransactionConflict("E011", "Transaction Conflict"),
}

impl GroupworkError {
    /// 是否为预期的业务结果（而非基础设施故障）
    ///
    /// 业务结果原样返回给调用方，不做重试；存储故障可由调用方自行决定是否重试。
    pub fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            GroupworkError::Validation(_)
                | GroupworkError::ConstraintViolation(_)
                | GroupworkError::Forbidden(_)
                | GroupworkError::NotFound(_)
                | GroupworkError::InvalidState(_)
        )
    }

    /// 事务因并发写入被后端拒绝，重新执行整个事务即可
    pub fn is_retryable(&self) -> bool {
        matches!(self, GroupworkError::TransactionConflict(_))
    }

    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GroupworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GroupworkError {}

impl From<sea_orm::DbErr> for GroupworkError {
    fn from(err: sea_orm::DbErr) -> Self {
        GroupworkError::StoreFailure(err.to_string())
    }
}

impl From<serde_json::Error> for GroupworkError {
    fn from(err: serde_json::Error) -> Self {
        GroupworkError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GroupworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GroupworkError::validation("test").code(), "E001");
        assert_eq!(GroupworkError::constraint_violation("test").code(), "E002");
        assert_eq!(GroupworkError::invalid_state("test").code(), "E005");
        assert_eq!(GroupworkError::store_failure("test").code(), "E006");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            GroupworkError::forbidden("test").error_type(),
            "Forbidden"
        );
        assert_eq!(
            GroupworkError::not_found("test").error_type(),
            "Resource Not Found"
        );
    }

    #[test]
    fn test_business_outcomes() {
        assert!(GroupworkError::invalid_state("closed").is_business_outcome());
        assert!(GroupworkError::constraint_violation("pair").is_business_outcome());
        assert!(!GroupworkError::store_failure("io").is_business_outcome());
        assert!(!GroupworkError::database_connection("down").is_business_outcome());
        assert!(!GroupworkError::transaction_conflict("busy").is_business_outcome());
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(GroupworkError::transaction_conflict("database is locked").is_retryable());
        assert!(!GroupworkError::store_failure("disk full").is_retryable());
        assert!(!GroupworkError::invalid_state("closed").is_retryable());
    }

    #[test]
    fn test_format_simple() {
        let err = GroupworkError::validation("group must have between 2 and 6 students");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("between 2 and 6"));
    }

    #[test]
    fn test_db_err_becomes_store_failure() {
        let err: GroupworkError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.code(), "E006");
        assert!(err.message().contains("boom"));
    }
}
