use std::collections::{BTreeMap, HashMap};

use affinity_algo::{ContentItem, LearnerProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{
    Assignment, AssignmentStatus, AssignmentStore, ContentStore, LearnerProfileStore, StoreError,
};

#[derive(Debug, Default)]
struct AssignmentTable {
    /// Insertion order; rows are never removed
    rows: Vec<Assignment>,
    by_token: HashMap<String, usize>,
}

/// Process-local store used by tests and when `DATABASE_URL` is unset.
#[derive(Debug, Default)]
pub struct MemoryStore {
    learners: RwLock<HashMap<String, LearnerProfile>>,
    contents: RwLock<BTreeMap<String, ContentItem>>,
    assignments: RwLock<AssignmentTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.read().rows.len()
    }
}

#[async_trait]
impl LearnerProfileStore for MemoryStore {
    async fn get_learner(&self, learner_id: &str) -> Result<Option<LearnerProfile>, StoreError> {
        Ok(self.learners.read().get(learner_id).cloned())
    }

    async fn put_learner(&self, profile: &LearnerProfile) -> Result<(), StoreError> {
        self.learners
            .write()
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_content(&self, content_id: &str) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.contents.read().get(content_id).cloned())
    }

    async fn insert_content(&self, item: &ContentItem) -> Result<bool, StoreError> {
        let mut contents = self.contents.write();
        if contents.contains_key(&item.id) {
            return Ok(false);
        }
        contents.insert(item.id.clone(), item.clone());
        Ok(true)
    }

    async fn list_contents(&self) -> Result<Vec<ContentItem>, StoreError> {
        Ok(self.contents.read().values().cloned().collect())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, StoreError> {
        let mut table = self.assignments.write();
        if table.by_token.contains_key(&assignment.assignment_token) {
            return Err(StoreError::DuplicateToken);
        }
        let idx = table.rows.len();
        table
            .by_token
            .insert(assignment.assignment_token.clone(), idx);
        table.rows.push(assignment.clone());
        Ok(assignment)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Assignment>, StoreError> {
        let table = self.assignments.read();
        Ok(table
            .by_token
            .get(token)
            .map(|&idx| table.rows[idx].clone()))
    }

    async fn update_status(
        &self,
        token: &str,
        expected: AssignmentStatus,
        status: AssignmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut table = self.assignments.write();
        let Some(&idx) = table.by_token.get(token) else {
            return Ok(false);
        };
        let row = &mut table.rows[idx];
        if row.status != expected {
            return Ok(false);
        }
        row.status = status;
        row.updated_at = updated_at;
        Ok(true)
    }

    async fn list_by_learner(&self, learner_id: &str) -> Result<Vec<Assignment>, StoreError> {
        let table = self.assignments.read();
        let mut rows: Vec<Assignment> = table
            .rows
            .iter()
            .rev()
            .filter(|a| a.learner_id == learner_id)
            .cloned()
            .collect();
        // stable: ties stay newest-inserted first
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, StoreError> {
        let table = self.assignments.read();
        Ok(table
            .rows
            .iter()
            .filter(|a| a.status == AssignmentStatus::Pending && a.created_at < cutoff)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn assignment(token: &str, learner: &str, created_at: DateTime<Utc>) -> Assignment {
        Assignment {
            id: format!("id-{token}"),
            learner_id: learner.to_string(),
            content_id: "c1".to_string(),
            affinity_score: 0.5,
            assignment_token: token.to_string(),
            status: AssignmentStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_duplicate_token_rejected() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_assignment(assignment("t1", "l1", now)).await.unwrap();
        let err = store
            .insert_assignment(assignment("t1", "l2", now))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateToken));
        assert_eq!(store.assignment_count(), 1);
    }

    #[tokio::test]
    async fn test_update_status_is_compare_and_set() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_assignment(assignment("t1", "l1", now)).await.unwrap();

        let later = now + Duration::seconds(5);
        assert!(store
            .update_status("t1", AssignmentStatus::Pending, AssignmentStatus::Completed, later)
            .await
            .unwrap());
        assert!(!store
            .update_status("t1", AssignmentStatus::Pending, AssignmentStatus::Expired, later)
            .await
            .unwrap());
        assert!(!store
            .update_status("missing", AssignmentStatus::Pending, AssignmentStatus::Expired, later)
            .await
            .unwrap());

        let row = store.find_by_token("t1").await.unwrap().unwrap();
        assert_eq!(row.status, AssignmentStatus::Completed);
        assert_eq!(row.updated_at, later);
    }

    #[tokio::test]
    async fn test_list_by_learner_newest_first() {
        let store = MemoryStore::new();
        let base = Utc::now();
        store.insert_assignment(assignment("a", "l1", base)).await.unwrap();
        store
            .insert_assignment(assignment("b", "l1", base + Duration::seconds(10)))
            .await
            .unwrap();
        store.insert_assignment(assignment("c", "l2", base)).await.unwrap();
        // same timestamp as "a", inserted later
        store.insert_assignment(assignment("d", "l1", base)).await.unwrap();

        let tokens: Vec<String> = store
            .list_by_learner("l1")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.assignment_token)
            .collect();
        assert_eq!(tokens, vec!["b", "d", "a"]);
    }

    #[tokio::test]
    async fn test_content_is_write_once() {
        let store = MemoryStore::new();
        let item = ContentItem {
            id: "c1".to_string(),
            difficulty_vector: vec![0.5],
            knowledge_domains: Default::default(),
            pedagogical_attributes: vec![1.0],
        };
        assert!(store.insert_content(&item).await.unwrap());

        let mut changed = item.clone();
        changed.difficulty_vector = vec![0.9];
        assert!(!store.insert_content(&changed).await.unwrap());
        assert_eq!(store.get_content("c1").await.unwrap(), Some(item));
    }
}
