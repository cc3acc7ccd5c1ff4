//! 小组组成约束检查
//!
//! 在任何任务、小组或成员写入之前调用，只读。

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::errors::{GroupworkError, Result};
use crate::storage::PairHistory;

pub const MIN_GROUP_SIZE: usize = 2;
pub const MAX_GROUP_SIZE: usize = 6;
/// 同一教师名下两名学生此前最多共同分组的任务数
pub const MAX_SHARED_ASSIGNMENTS: u64 = 2;

/// 校验小组人数与重复成员
pub fn validate_group_shape(student_ids: &[i64]) -> Result<()> {
    if student_ids.len() < MIN_GROUP_SIZE || student_ids.len() > MAX_GROUP_SIZE {
        return Err(GroupworkError::validation(format!(
            "group must have between {MIN_GROUP_SIZE} and {MAX_GROUP_SIZE} students, got {}",
            student_ids.len()
        )));
    }

    let mut seen = HashSet::with_capacity(student_ids.len());
    if let Some(dup) = student_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(GroupworkError::validation(format!(
            "student {dup} appears more than once in the group"
        )));
    }

    Ok(())
}

/// 所有无序学生对
fn unordered_pairs(student_ids: &[i64]) -> impl Iterator<Item = (i64, i64)> + '_ {
    student_ids
        .iter()
        .enumerate()
        .flat_map(move |(i, &a)| student_ids[i + 1..].iter().map(move |&b| (a, b)))
}

/// 完整检查：人数、重复、以及每一对学生的共同分组次数
///
/// 任一学生对此前已在该教师的 [`MAX_SHARED_ASSIGNMENTS`] 个任务中同组即拒绝，
/// 首个违规立即中止。
pub async fn check_group<P>(history: &P, student_ids: &[i64], teacher_id: i64) -> Result<()>
where
    P: PairHistory + ?Sized,
{
    validate_group_shape(student_ids)?;

    for (a, b) in unordered_pairs(student_ids) {
        let shared = history.count_shared_assignments(a, b, teacher_id).await?;
        debug!(
            "Students {} and {} shared {} assignment(s) of teacher {}",
            a, b, shared, teacher_id
        );
        if shared >= MAX_SHARED_ASSIGNMENTS {
            warn!(
                "Group rejected for teacher {}: students {} and {} already grouped {} times",
                teacher_id, a, b, shared
            );
            return Err(GroupworkError::constraint_violation(format!(
                "students {a} and {b} have already worked together in {shared} assignments of this teacher"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeHistory {
        counts: HashMap<(i64, i64), u64>,
    }

    impl FakeHistory {
        fn new(entries: &[((i64, i64), u64)]) -> Self {
            Self {
                counts: entries.iter().copied().collect(),
            }
        }
    }

    #[async_trait::async_trait]
    impl PairHistory for FakeHistory {
        async fn count_shared_assignments(&self, a: i64, b: i64, _teacher_id: i64) -> Result<u64> {
            let key = (a.min(b), a.max(b));
            Ok(self.counts.get(&key).copied().unwrap_or(0))
        }
    }

    #[test]
    fn test_group_size_bounds() {
        for n in 0..=8usize {
            let ids: Vec<i64> = (1..=n as i64).collect();
            let ok = validate_group_shape(&ids).is_ok();
            assert_eq!(ok, (2..=6).contains(&n), "size {n}");
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = validate_group_shape(&[1, 2, 1]).unwrap_err();
        assert!(matches!(err, GroupworkError::Validation(_)));
    }

    #[test]
    fn test_unordered_pairs() {
        let pairs: Vec<_> = unordered_pairs(&[1, 2, 3]).collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn test_pair_below_cap_accepted() {
        let history = FakeHistory::new(&[((1, 2), 1)]);
        assert!(check_group(&history, &[1, 2, 3], 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_pair_at_cap_rejected() {
        let history = FakeHistory::new(&[((2, 3), 2)]);
        let err = check_group(&history, &[1, 2, 3], 10).await.unwrap_err();
        assert!(matches!(err, GroupworkError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_shape_checked_before_history() {
        let history = FakeHistory::new(&[((1, 2), 5)]);
        let err = check_group(&history, &[1], 10).await.unwrap_err();
        assert!(matches!(err, GroupworkError::Validation(_)));
    }
}
