//! 班级状态聚合与排序

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    assignments::entities::AssignmentStatus,
    class_status::{
        entities::{Participation, StudentStatus},
        requests::ClassStatusOrder,
    },
    users::entities::User,
};
use crate::services::grades::weighted_average;

/// 每名学生一行（包括没有任何参与记录的学生）
pub fn aggregate(students: Vec<User>, participations: &[Participation]) -> Vec<StudentStatus> {
    let mut by_student: HashMap<i64, Vec<&Participation>> = HashMap::new();
    for p in participations {
        by_student.entry(p.student_id).or_default().push(p);
    }

    students
        .into_iter()
        .map(|student| {
            let own = by_student.remove(&student.id).unwrap_or_default();

            let open_count = own
                .iter()
                .filter(|p| p.status == AssignmentStatus::Open)
                .count() as u32;
            let closed_count = own
                .iter()
                .filter(|p| p.status == AssignmentStatus::Closed)
                .count() as u32;
            let weighted_average = weighted_average(own.iter().filter_map(|p| {
                match (p.status, p.score) {
                    (AssignmentStatus::Closed, Some(score)) => Some((score, p.group_size)),
                    _ => None,
                }
            }));

            StudentStatus {
                student_id: student.id,
                display_name: student.name().to_string(),
                username: student.username,
                open_count,
                closed_count,
                weighted_average,
            }
        })
        .collect()
}

/// 空值排在最后，其余降序
fn compare_average_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 按指定方式排序，平局按学生 ID 升序
pub fn sort_statuses(statuses: &mut [StudentStatus], order: ClassStatusOrder) {
    statuses.sort_by(|a, b| {
        let primary = match order {
            ClassStatusOrder::Alphabetical => a
                .display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase()),
            ClassStatusOrder::AssignmentCount => b.assignment_count().cmp(&a.assignment_count()),
            ClassStatusOrder::Average => {
                compare_average_desc(a.weighted_average, b.weighted_average)
            }
        };
        primary.then(a.student_id.cmp(&b.student_id))
    });
}
