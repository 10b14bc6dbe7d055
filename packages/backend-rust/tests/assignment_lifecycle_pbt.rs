//! Property-based tests for the assignment lifecycle
//!
//! - Only pending assignments move, and only to completed or expired
//! - The first accepted transition is final; later requests change nothing
//! - Stored affinity score always equals the live score and stays in [0, 1]

use std::collections::BTreeMap;

use proptest::prelude::*;

use affinity_algo::{ContentItem, LearnerProfile, PerformanceEntry};
use affinity_backend::services::{AffinityError, AffinityService};
use affinity_backend::store::AssignmentStatus;

mod common;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_f64_0_1() -> impl Strategy<Value = f64> {
    (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

fn arb_status() -> impl Strategy<Value = AssignmentStatus> {
    prop_oneof![
        Just(AssignmentStatus::Pending),
        Just(AssignmentStatus::Completed),
        Just(AssignmentStatus::Expired),
    ]
}

fn arb_learner() -> impl Strategy<Value = LearnerProfile> {
    (
        prop::collection::vec(arb_f64_0_1(), 2),
        prop::collection::vec(arb_f64_0_1(), 3),
        arb_f64_0_1(),
        prop::collection::vec(arb_f64_0_1(), 0..8),
    )
        .prop_map(|(knowledge, preferences, gap, scores)| {
            let mut learner = LearnerProfile::new("learner");
            learner.knowledge_state = knowledge;
            learner.learning_preferences = preferences;
            learner
                .learning_patterns
                .concept_gaps
                .insert("physics".to_string(), gap);
            learner.learning_patterns.historical_performance = scores
                .into_iter()
                .enumerate()
                .map(|(i, score)| PerformanceEntry {
                    score,
                    timestamp: i as i64,
                })
                .collect();
            learner
        })
}

fn arb_content() -> impl Strategy<Value = ContentItem> {
    (
        prop::collection::vec(arb_f64_0_1(), 1..5),
        arb_f64_0_1(),
        arb_f64_0_1(),
        prop::collection::vec(arb_f64_0_1(), 3),
    )
        .prop_map(|(difficulty, math, physics, pedagogy)| ContentItem {
            id: "content".to_string(),
            difficulty_vector: difficulty,
            knowledge_domains: BTreeMap::from([
                ("math".to_string(), math),
                ("physics".to_string(), physics),
            ]),
            pedagogical_attributes: pedagogy,
        })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn seed(service: &AffinityService, learner: LearnerProfile, content: ContentItem) {
    service.save_learner(learner).await.unwrap();
    service.author_content(content).await.unwrap();
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_first_terminal_transition_wins(
        learner in arb_learner(),
        content in arb_content(),
        requests in prop::collection::vec(arb_status(), 1..12),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let service = common::test_service();
            seed(&service, learner, content).await;
            let assignment = service.create_assignment("learner", "content").await.unwrap();
            let token = assignment.assignment_token;

            let mut settled: Option<AssignmentStatus> = None;
            for target in requests {
                let result = service.set_assignment_status(&token, target).await;
                match (settled, target) {
                    (None, AssignmentStatus::Pending) | (Some(_), _) => {
                        prop_assert!(
                            matches!(result, Err(AffinityError::InvalidTransition { .. })),
                            "request {target} should have been refused"
                        );
                    }
                    (None, terminal) => {
                        prop_assert_eq!(result.unwrap().status, terminal);
                        settled = Some(terminal);
                    }
                }
            }

            let stored = service.get_assignment(&token).await.unwrap();
            prop_assert_eq!(stored.status, settled.unwrap_or(AssignmentStatus::Pending));
            Ok(())
        })?;
    }

    #[test]
    fn prop_assignment_score_matches_live_score(
        learner in arb_learner(),
        content in arb_content(),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let service = common::test_service();
            seed(&service, learner, content).await;

            let live = service.calculate_affinity("learner", "content").await.unwrap();
            let assignment = service.create_assignment("learner", "content").await.unwrap();

            prop_assert!((0.0..=1.0).contains(&live.score));
            prop_assert_eq!(assignment.affinity_score, live.score);
            prop_assert_eq!(assignment.status, AssignmentStatus::Pending);
            Ok(())
        })?;
    }
}
