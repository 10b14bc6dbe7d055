//! Persistence seams of the affinity core.
//!
//! Three stores back the service: learner profiles, content items and
//! assignments. [`MemoryStore`] serves tests and DB-less deployments,
//! [`PgStore`] persists to Postgres.

mod memory;
pub mod models;
mod postgres;

use std::sync::Arc;

use affinity_algo::{ContentItem, LearnerProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::DatabaseProxy;

pub use memory::MemoryStore;
pub use models::{Assignment, AssignmentStatus};
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("assignment token already exists")]
    DuplicateToken,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait LearnerProfileStore: Send + Sync {
    async fn get_learner(&self, learner_id: &str) -> Result<Option<LearnerProfile>, StoreError>;

    /// Inserts or replaces the whole profile.
    async fn put_learner(&self, profile: &LearnerProfile) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_content(&self, content_id: &str) -> Result<Option<ContentItem>, StoreError>;

    /// Returns `false` without writing when the id is already authored.
    async fn insert_content(&self, item: &ContentItem) -> Result<bool, StoreError>;

    /// All content items ordered by id.
    async fn list_contents(&self) -> Result<Vec<ContentItem>, StoreError>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Fails with [`StoreError::DuplicateToken`] if the token was ever used.
    async fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Assignment>, StoreError>;

    /// Compare-and-set: writes only while the row is still in `expected`.
    async fn update_status(
        &self,
        token: &str,
        expected: AssignmentStatus,
        status: AssignmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Newest first; equal timestamps keep reverse insertion order.
    async fn list_by_learner(&self, learner_id: &str) -> Result<Vec<Assignment>, StoreError>;

    async fn list_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Postgres,
}

impl StoreKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Postgres => "postgres",
        }
    }
}

#[derive(Clone)]
pub struct Stores {
    pub learners: Arc<dyn LearnerProfileStore>,
    pub contents: Arc<dyn ContentStore>,
    pub assignments: Arc<dyn AssignmentStore>,
    kind: StoreKind,
}

impl Stores {
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            learners: store.clone(),
            contents: store.clone(),
            assignments: store,
            kind: StoreKind::Memory,
        }
    }

    pub fn postgres(proxy: Arc<DatabaseProxy>) -> Self {
        let store = Arc::new(PgStore::new(proxy));
        Self {
            learners: store.clone(),
            contents: store.clone(),
            assignments: store,
            kind: StoreKind::Postgres,
        }
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }
}
