use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use affinity_algo::{ContentItem, LearnerProfile};
use affinity_backend::services::{AffinityError, AffinityService};
use affinity_backend::store::AssignmentStatus;

mod common;

async fn seeded_service() -> Arc<AffinityService> {
    let service = common::test_service();

    let mut learner = LearnerProfile::new("alice");
    learner.knowledge_state = vec![0.3, 0.7];
    learner.learning_preferences = vec![0.5, 0.5];
    service.save_learner(learner).await.unwrap();

    service
        .author_content(ContentItem {
            id: "optics".to_string(),
            difficulty_vector: vec![0.4],
            knowledge_domains: BTreeMap::from([("physics".to_string(), 1.0)]),
            pedagogical_attributes: vec![1.0, 1.0],
        })
        .await
        .unwrap();

    Arc::new(service)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_tokens() {
    let service = seeded_service().await;

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.create_assignment("alice", "optics").await })
        })
        .collect();

    let mut tokens = HashSet::new();
    for handle in handles {
        let assignment = handle.await.unwrap().unwrap();
        assert!(tokens.insert(assignment.assignment_token));
    }

    let listed = service.get_assignments_for_learner("alice").await.unwrap();
    assert_eq!(listed.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_status_updates_settle_once() {
    let service = seeded_service().await;
    let assignment = service.create_assignment("alice", "optics").await.unwrap();
    let token = assignment.assignment_token;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            let token = token.clone();
            let target = if i % 2 == 0 {
                AssignmentStatus::Completed
            } else {
                AssignmentStatus::Expired
            };
            tokio::spawn(async move { service.set_assignment_status(&token, target).await })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(updated) => winners.push(updated.status),
            Err(AffinityError::InvalidTransition { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    let stored = service.get_assignment(&token).await.unwrap();
    assert_eq!(stored.status, winners[0]);
}
