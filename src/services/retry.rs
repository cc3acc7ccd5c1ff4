//! 事务冲突重试

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::errors::Result;

/// 单次业务操作最多执行的事务次数
pub const MAX_TX_ATTEMPTS: u32 = 3;

const BASE_BACKOFF_MS: u64 = 20;

/// 第 `attempt` 次失败后的等待时间，`None` 表示不再重试
pub fn backoff_after(attempt: u32) -> Option<Duration> {
    if attempt >= MAX_TX_ATTEMPTS {
        return None;
    }
    Some(Duration::from_millis(BASE_BACKOFF_MS << attempt))
}

/// 重新执行整个事务，直到成功、得到非冲突错误或次数用尽
///
/// `run` 每次调用都必须开启新事务并重新读取状态，业务检查在新的快照上重新判定。
pub async fn with_tx_retry<T, F, Fut>(operation: &str, mut run: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match run().await {
            Err(err) if err.is_retryable() => match backoff_after(attempt) {
                Some(delay) => {
                    warn!(
                        "{} hit a transaction conflict (attempt {}/{}), retrying in {:?}: {}",
                        operation,
                        attempt,
                        MAX_TX_ATTEMPTS,
                        delay,
                        err.message()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(err),
            },
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GroupworkError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_grows_then_stops() {
        assert_eq!(backoff_after(1), Some(Duration::from_millis(40)));
        assert_eq!(backoff_after(2), Some(Duration::from_millis(80)));
        assert_eq!(backoff_after(MAX_TX_ATTEMPTS), None);
    }

    #[tokio::test]
    async fn test_conflicts_are_retried_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_tx_retry("test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(GroupworkError::transaction_conflict("database is locked"))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_business_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = with_tx_retry("test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GroupworkError::invalid_state("closed"))
        })
        .await;

        assert!(matches!(result, Err(GroupworkError::InvalidState(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_conflict_surfaces_after_last_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = with_tx_retry("test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GroupworkError::transaction_conflict("busy"))
        })
        .await;

        assert!(matches!(result, Err(GroupworkError::TransactionConflict(_))));
        assert_eq!(counter.load(Ordering::SeqCst), MAX_TX_ATTEMPTS);
    }
}
