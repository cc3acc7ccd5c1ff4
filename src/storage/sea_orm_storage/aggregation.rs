//! 聚合查询：同组历史、班级参与记录、学生成绩

use std::collections::{HashMap, HashSet};

use crate::entity::prelude::{Assignments, GradeModel, Grades, GroupMembers, Groups, Users};
use crate::entity::{assignments, grades, group_members, groups, users};
use super::db_error;
use crate::errors::Result;
use crate::models::{
    assignments::entities::AssignmentStatus, class_status::entities::Participation,
    grades::entities::GradeRecord,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect,
    RelationTrait,
};

async fn group_ids_of_student<C: ConnectionTrait>(conn: &C, student_id: i64) -> Result<Vec<i64>> {
    GroupMembers::find()
        .select_only()
        .column(group_members::Column::GroupId)
        .filter(group_members::Column::StudentId.eq(student_id))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| db_error("查询学生小组失败", e))
}

/// 统计小组人数：group_id -> 成员数
async fn group_sizes<C: ConnectionTrait>(
    conn: &C,
    group_ids: &[i64],
) -> Result<HashMap<i64, u32>> {
    let members = GroupMembers::find()
        .filter(group_members::Column::GroupId.is_in(group_ids.iter().copied()))
        .all(conn)
        .await
        .map_err(|e| db_error("查询小组成员失败", e))?;

    let mut sizes: HashMap<i64, u32> = HashMap::new();
    for member in members {
        *sizes.entry(member.group_id).or_insert(0) += 1;
    }
    Ok(sizes)
}

/// 两名学生在同一教师名下共同所在的不同任务数
pub(super) async fn count_shared_assignments<C: ConnectionTrait>(
    conn: &C,
    student_a: i64,
    student_b: i64,
    teacher_id: i64,
) -> Result<u64> {
    if student_a == student_b {
        return Ok(0);
    }

    let groups_a: HashSet<i64> = group_ids_of_student(conn, student_a)
        .await?
        .into_iter()
        .collect();
    let shared: Vec<i64> = group_ids_of_student(conn, student_b)
        .await?
        .into_iter()
        .filter(|id| groups_a.contains(id))
        .collect();

    if shared.is_empty() {
        return Ok(0);
    }

    // 每个任务恰好一个小组，统计任务行即为去重计数
    Assignments::find()
        .join(JoinType::InnerJoin, assignments::Relation::Group.def())
        .filter(groups::Column::Id.is_in(shared))
        .filter(assignments::Column::TeacherId.eq(teacher_id))
        .count(conn)
        .await
        .map_err(|e| db_error("统计共同任务失败", e))
}

/// 教师名下每个任务的每名成员一条参与记录
pub(super) async fn list_teacher_participations<C: ConnectionTrait>(
    conn: &C,
    teacher_id: i64,
) -> Result<Vec<Participation>> {
    let teacher_assignments = Assignments::find()
        .filter(assignments::Column::TeacherId.eq(teacher_id))
        .all(conn)
        .await
        .map_err(|e| db_error("查询教师任务失败", e))?;

    if teacher_assignments.is_empty() {
        return Ok(Vec::new());
    }

    let statuses: HashMap<i64, AssignmentStatus> = teacher_assignments
        .into_iter()
        .map(|m| {
            let assignment = m.into_assignment();
            (assignment.id, assignment.status)
        })
        .collect();
    let assignment_ids: Vec<i64> = statuses.keys().copied().collect();

    let group_rows = Groups::find()
        .filter(groups::Column::AssignmentId.is_in(assignment_ids.iter().copied()))
        .all(conn)
        .await
        .map_err(|e| db_error("查询任务小组失败", e))?;
    let group_to_assignment: HashMap<i64, i64> = group_rows
        .into_iter()
        .map(|g| (g.id, g.assignment_id))
        .collect();
    let group_ids: Vec<i64> = group_to_assignment.keys().copied().collect();

    let scores: HashMap<(i64, i64), i32> = Grades::find()
        .filter(grades::Column::AssignmentId.is_in(assignment_ids))
        .all(conn)
        .await
        .map_err(|e| db_error("查询任务评分失败", e))?
        .into_iter()
        .map(|g: GradeModel| ((g.assignment_id, g.group_id), g.score))
        .collect();

    let members = GroupMembers::find()
        .filter(group_members::Column::GroupId.is_in(group_ids))
        .all(conn)
        .await
        .map_err(|e| db_error("查询小组成员失败", e))?;

    let mut sizes: HashMap<i64, u32> = HashMap::new();
    for member in &members {
        *sizes.entry(member.group_id).or_insert(0) += 1;
    }

    let participations = members
        .into_iter()
        .filter_map(|member| {
            let assignment_id = *group_to_assignment.get(&member.group_id)?;
            let status = *statuses.get(&assignment_id)?;
            Some(Participation {
                student_id: member.student_id,
                assignment_id,
                status,
                group_size: sizes.get(&member.group_id).copied().unwrap_or(0),
                score: scores.get(&(assignment_id, member.group_id)).copied(),
            })
        })
        .collect();

    Ok(participations)
}

/// 学生所有已关闭且已评分任务的成绩，按评分时间排序
pub(super) async fn list_student_grades<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
) -> Result<Vec<GradeRecord>> {
    let group_ids = group_ids_of_student(conn, student_id).await?;
    if group_ids.is_empty() {
        return Ok(Vec::new());
    }

    let grade_rows = Grades::find()
        .filter(grades::Column::GroupId.is_in(group_ids.iter().copied()))
        .all(conn)
        .await
        .map_err(|e| db_error("查询学生评分失败", e))?;

    if grade_rows.is_empty() {
        return Ok(Vec::new());
    }

    let closed = Assignments::find()
        .filter(assignments::Column::Id.is_in(grade_rows.iter().map(|g| g.assignment_id)))
        .filter(assignments::Column::Status.eq(AssignmentStatus::CLOSED))
        .all(conn)
        .await
        .map_err(|e| db_error("查询已关闭任务失败", e))?;
    let closed: HashMap<i64, assignments::Model> = closed.into_iter().map(|a| (a.id, a)).collect();

    let teacher_emails: HashMap<i64, String> = Users::find()
        .filter(users::Column::Id.is_in(closed.values().map(|a| a.teacher_id)))
        .all(conn)
        .await
        .map_err(|e| db_error("查询教师信息失败", e))?
        .into_iter()
        .map(|u| (u.id, u.email))
        .collect();

    let sizes = group_sizes(conn, &group_ids).await?;

    let mut records: Vec<GradeRecord> = grade_rows
        .into_iter()
        .filter_map(|grade| {
            let assignment = closed.get(&grade.assignment_id)?;
            Some(GradeRecord {
                assignment_id: grade.assignment_id,
                title: assignment.title.clone(),
                teacher_email: teacher_emails
                    .get(&assignment.teacher_id)
                    .cloned()
                    .unwrap_or_default(),
                score: grade.score,
                group_size: sizes.get(&grade.group_id).copied().unwrap_or(0),
                graded_at: crate::entity::from_timestamp(grade.graded_at),
            })
        })
        .collect();

    records.sort_by(|a, b| {
        a.graded_at
            .cmp(&b.graded_at)
            .then(a.assignment_id.cmp(&b.assignment_id))
    });

    Ok(records)
}
