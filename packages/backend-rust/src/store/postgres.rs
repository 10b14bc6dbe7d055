use std::sync::Arc;

use affinity_algo::{ContentItem, LearnerProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    Assignment, AssignmentStatus, AssignmentStore, ContentStore, LearnerProfileStore, StoreError,
};
use crate::db::operations;
use crate::db::DatabaseProxy;

pub struct PgStore {
    proxy: Arc<DatabaseProxy>,
}

impl PgStore {
    pub fn new(proxy: Arc<DatabaseProxy>) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl LearnerProfileStore for PgStore {
    async fn get_learner(&self, learner_id: &str) -> Result<Option<LearnerProfile>, StoreError> {
        Ok(operations::get_learner_profile(&self.proxy, learner_id).await?)
    }

    async fn put_learner(&self, profile: &LearnerProfile) -> Result<(), StoreError> {
        Ok(operations::upsert_learner_profile(&self.proxy, profile).await?)
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn get_content(&self, content_id: &str) -> Result<Option<ContentItem>, StoreError> {
        Ok(operations::get_content_item(&self.proxy, content_id).await?)
    }

    async fn insert_content(&self, item: &ContentItem) -> Result<bool, StoreError> {
        Ok(operations::insert_content_item(&self.proxy, item).await?)
    }

    async fn list_contents(&self) -> Result<Vec<ContentItem>, StoreError> {
        Ok(operations::list_content_items(&self.proxy).await?)
    }
}

#[async_trait]
impl AssignmentStore for PgStore {
    async fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, StoreError> {
        match operations::insert_assignment(&self.proxy, &assignment).await {
            Ok(()) => Ok(assignment),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateToken)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Assignment>, StoreError> {
        Ok(operations::find_assignment_by_token(&self.proxy, token).await?)
    }

    async fn update_status(
        &self,
        token: &str,
        expected: AssignmentStatus,
        status: AssignmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(
            operations::update_assignment_status(&self.proxy, token, expected, status, updated_at)
                .await?,
        )
    }

    async fn list_by_learner(&self, learner_id: &str) -> Result<Vec<Assignment>, StoreError> {
        Ok(operations::list_assignments_by_learner(&self.proxy, learner_id).await?)
    }

    async fn list_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, StoreError> {
        Ok(operations::list_pending_assignments_before(&self.proxy, cutoff).await?)
    }
}
