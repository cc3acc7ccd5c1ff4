use tracing::debug;

use super::GroupService;
use crate::errors::{GroupworkError, Result};
use crate::models::{
    assignments::responses::GroupMembersResponse,
    users::entities::{StudentSummary, User},
};

/// 小组成员：仅任务所属教师或小组成员可见
pub async fn members_of(
    service: &GroupService,
    caller: &User,
    group_id: i64,
) -> Result<GroupMembersResponse> {
    let storage = &service.storage;

    let group = storage
        .get_group_by_id(group_id)
        .await?
        .ok_or_else(|| GroupworkError::not_found(format!("group {group_id} does not exist")))?;

    let members = storage.list_group_members(group.id).await?;

    let allowed = if caller.is_teacher() {
        storage
            .get_assignment_by_id(group.assignment_id)
            .await?
            .is_some_and(|a| a.is_owned_by(caller.id))
    } else {
        members.iter().any(|m| m.id == caller.id)
    };

    if !allowed {
        debug!("User {} denied access to group {}", caller.id, group_id);
        return Err(GroupworkError::forbidden(format!(
            "not allowed to view members of group {group_id}"
        )));
    }

    Ok(GroupMembersResponse {
        group_id: group.id,
        assignment_id: group.assignment_id,
        members: members.into_iter().map(StudentSummary::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use crate::errors::GroupworkError;
    use crate::services::GroupService;
    use crate::test_support::setup;

    #[tokio::test]
    async fn group_members_visible_to_owner_and_members_only() {
        let ctx = setup().await;
        let created = ctx.create(&ctx.teacher, &[0, 1, 2]).await.expect("create");
        let groups = GroupService::new(ctx.storage.clone());

        let as_owner = groups
            .members_of(&ctx.teacher, created.group_id)
            .await
            .expect("owner can view");
        assert_eq!(as_owner.members.len(), 3);
        assert_eq!(as_owner.assignment_id, created.assignment.id);

        groups
            .members_of(ctx.student(1), created.group_id)
            .await
            .expect("member can view");

        assert!(matches!(
            groups.members_of(ctx.student(4), created.group_id).await,
            Err(GroupworkError::Forbidden(_))
        ));
        assert!(matches!(
            groups.members_of(&ctx.other_teacher, created.group_id).await,
            Err(GroupworkError::Forbidden(_))
        ));
        assert!(matches!(
            groups.members_of(&ctx.teacher, 4_242).await,
            Err(GroupworkError::NotFound(_))
        ));
    }
}
