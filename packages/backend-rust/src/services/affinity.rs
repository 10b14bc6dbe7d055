use std::sync::Arc;

use affinity_algo::{
    compute_affinity, rank_contents, AffinityBreakdown, AlgoError, ContentItem, DomainIndex,
    LearnerProfile, RankedContent,
};
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::token::{RandomTokenGenerator, TokenGenerator};
use crate::store::{Assignment, AssignmentStatus, StoreError, Stores};

/// Fresh tokens drawn when the store reports a duplicate.
const MAX_TOKEN_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum AffinityError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("invalid input: {0}")]
    InvalidInput(#[from] AlgoError),
    #[error("content already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: AssignmentStatus,
        to: AssignmentStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("ranking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AffinityError {
    fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Affinity scoring plus assignment lifecycle over the configured stores.
#[derive(Clone)]
pub struct AffinityService {
    stores: Stores,
    index: Arc<DomainIndex>,
    tokens: Arc<dyn TokenGenerator>,
}

impl AffinityService {
    pub fn new(stores: Stores, index: DomainIndex) -> Self {
        Self {
            stores,
            index: Arc::new(index),
            tokens: Arc::new(RandomTokenGenerator),
        }
    }

    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn domain_index(&self) -> &DomainIndex {
        &self.index
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    // ========================================================================
    // Profiles & content
    // ========================================================================

    pub async fn save_learner(
        &self,
        mut profile: LearnerProfile,
    ) -> Result<LearnerProfile, AffinityError> {
        profile.normalize();
        profile.validate(&self.index)?;
        self.stores.learners.put_learner(&profile).await?;
        debug!(learner_id = %profile.id, "learner profile saved");
        Ok(profile)
    }

    pub async fn author_content(&self, item: ContentItem) -> Result<ContentItem, AffinityError> {
        item.validate(&self.index)?;
        if !self.stores.contents.insert_content(&item).await? {
            return Err(AffinityError::AlreadyExists(item.id));
        }
        debug!(content_id = %item.id, "content item authored");
        Ok(item)
    }

    pub async fn get_learner(&self, learner_id: &str) -> Result<LearnerProfile, AffinityError> {
        self.stores
            .learners
            .get_learner(learner_id)
            .await?
            .ok_or_else(|| AffinityError::not_found("learner", learner_id))
    }

    pub async fn get_content(&self, content_id: &str) -> Result<ContentItem, AffinityError> {
        self.stores
            .contents
            .get_content(content_id)
            .await?
            .ok_or_else(|| AffinityError::not_found("content", content_id))
    }

    pub async fn list_contents(&self) -> Result<Vec<ContentItem>, AffinityError> {
        Ok(self.stores.contents.list_contents().await?)
    }

    async fn load_pair(
        &self,
        learner_id: &str,
        content_id: &str,
    ) -> Result<(LearnerProfile, ContentItem), AffinityError> {
        let (learner, content) = tokio::try_join!(
            self.stores.learners.get_learner(learner_id),
            self.stores.contents.get_content(content_id),
        )?;
        let learner = learner.ok_or_else(|| AffinityError::not_found("learner", learner_id))?;
        let content = content.ok_or_else(|| AffinityError::not_found("content", content_id))?;
        Ok((learner, content))
    }

    // ========================================================================
    // Scoring
    // ========================================================================

    pub async fn calculate_affinity(
        &self,
        learner_id: &str,
        content_id: &str,
    ) -> Result<AffinityBreakdown, AffinityError> {
        let (learner, content) = self.load_pair(learner_id, content_id).await?;
        let breakdown = compute_affinity(&learner, &content, &self.index)?;

        if !breakdown.degenerate.is_empty() {
            debug!(
                learner_id,
                content_id,
                signals = ?breakdown.degenerate,
                "zero-norm vector scored as 0"
            );
        }

        Ok(breakdown)
    }

    pub async fn recommend_for_learner(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> Result<Vec<RankedContent>, AffinityError> {
        let learner = self.get_learner(learner_id).await?;
        let contents = self.list_contents().await?;
        let index = Arc::clone(&self.index);

        let outcome =
            tokio::task::spawn_blocking(move || rank_contents(&learner, &contents, &index, limit))
                .await?;

        for (content_id, err) in &outcome.rejected {
            warn!(learner_id, content_id = %content_id, error = %err, "content skipped in ranking");
        }

        Ok(outcome.ranked)
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    pub async fn create_assignment(
        &self,
        learner_id: &str,
        content_id: &str,
    ) -> Result<Assignment, AffinityError> {
        let breakdown = self.calculate_affinity(learner_id, content_id).await?;
        let now = Utc::now();

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let assignment = Assignment {
                id: Uuid::new_v4().to_string(),
                learner_id: learner_id.to_string(),
                content_id: content_id.to_string(),
                affinity_score: breakdown.score,
                assignment_token: self.tokens.generate(),
                status: AssignmentStatus::Pending,
                created_at: now,
                updated_at: now,
            };

            match self.stores.assignments.insert_assignment(assignment).await {
                Ok(created) => {
                    info!(
                        learner_id,
                        content_id,
                        affinity_score = created.affinity_score,
                        "assignment created"
                    );
                    return Ok(created);
                }
                Err(StoreError::DuplicateToken) => {
                    warn!(attempt, "assignment token collision, drawing a new token");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(StoreError::DuplicateToken.into())
    }

    pub async fn get_assignments_for_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<Assignment>, AffinityError> {
        Ok(self.stores.assignments.list_by_learner(learner_id).await?)
    }

    pub async fn get_assignment(&self, token: &str) -> Result<Assignment, AffinityError> {
        self.stores
            .assignments
            .find_by_token(token)
            .await?
            .ok_or_else(|| AffinityError::not_found("assignment", token))
    }

    pub async fn set_assignment_status(
        &self,
        token: &str,
        status: AssignmentStatus,
    ) -> Result<Assignment, AffinityError> {
        let current = self.get_assignment(token).await?;

        if !current.status.can_transition_to(status) {
            return Err(AffinityError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let now = Utc::now();
        let updated = self
            .stores
            .assignments
            .update_status(token, current.status, status, now)
            .await?;

        if !updated {
            // lost a race with another writer
            let latest = self
                .stores
                .assignments
                .find_by_token(token)
                .await?
                .map_or(current.status, |a| a.status);
            return Err(AffinityError::InvalidTransition {
                from: latest,
                to: status,
            });
        }

        info!(assignment_id = %current.id, from = %current.status, to = %status, "assignment status changed");

        Ok(Assignment {
            status,
            updated_at: now,
            ..current
        })
    }

    /// Moves every assignment still pending after `ttl` to `expired`.
    pub async fn expire_stale_assignments(&self, ttl: Duration) -> Result<usize, AffinityError> {
        let cutoff = Utc::now() - ttl;
        let stale = self
            .stores
            .assignments
            .list_pending_created_before(cutoff)
            .await?;

        let mut expired = 0;
        for assignment in &stale {
            let moved = self
                .stores
                .assignments
                .update_status(
                    &assignment.assignment_token,
                    AssignmentStatus::Pending,
                    AssignmentStatus::Expired,
                    Utc::now(),
                )
                .await?;
            if moved {
                expired += 1;
            }
        }

        if expired > 0 {
            info!(expired, cutoff = %cutoff, "stale assignments expired");
        }

        Ok(expired)
    }
}
