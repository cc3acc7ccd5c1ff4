pub mod checker;
pub mod members;

use std::sync::Arc;

use crate::errors::Result;
use crate::models::{assignments::responses::GroupMembersResponse, users::entities::User};
use crate::storage::Storage;

pub use checker::{MAX_GROUP_SIZE, MAX_SHARED_ASSIGNMENTS, MIN_GROUP_SIZE};

pub struct GroupService {
    storage: Arc<dyn Storage>,
}

impl GroupService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // 查看小组成员
    pub async fn members_of(&self, caller: &User, group_id: i64) -> Result<GroupMembersResponse> {
        members::members_of(self, caller, group_id).await
    }
}
