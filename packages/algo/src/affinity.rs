//! Affinity Aggregator
//!
//! Blends four signals into one bounded suitability score:
//!
//! ```text
//! score = 0.4·knowledge_alignment + 0.3·gap_coverage
//!       + 0.2·progressive_difficulty + 0.1·learning_style_match
//! ```
//!
//! The final score is clamped to [0, 1]. Structurally invalid input
//! (mismatched dimensions, non-finite values) is an error, never a default
//! score.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::difficulty::progressive_difficulty;
use crate::domain::DomainIndex;
use crate::error::AlgoError;
use crate::gap::gap_coverage;
use crate::sanitize::clamp_unit;
use crate::similarity::{cosine_similarity, Similarity};
use crate::types::{
    AffinityBreakdown, ContentItem, LearnerProfile, RankedContent, RankingOutcome, Signal,
    WEIGHT_GAP_COVERAGE, WEIGHT_KNOWLEDGE_ALIGNMENT, WEIGHT_LEARNING_STYLE,
    WEIGHT_PROGRESSIVE_DIFFICULTY,
};

/// Signal weights; they sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffinityWeights {
    pub knowledge_alignment: f64,
    pub gap_coverage: f64,
    pub progressive_difficulty: f64,
    pub learning_style_match: f64,
}

impl AffinityWeights {
    pub const STANDARD: Self = Self {
        knowledge_alignment: WEIGHT_KNOWLEDGE_ALIGNMENT,
        gap_coverage: WEIGHT_GAP_COVERAGE,
        progressive_difficulty: WEIGHT_PROGRESSIVE_DIFFICULTY,
        learning_style_match: WEIGHT_LEARNING_STYLE,
    };

    pub fn total(&self) -> f64 {
        self.knowledge_alignment
            + self.gap_coverage
            + self.progressive_difficulty
            + self.learning_style_match
    }

    fn blend(&self, breakdown: &AffinityBreakdown) -> f64 {
        self.knowledge_alignment * breakdown.knowledge_alignment
            + self.gap_coverage * breakdown.gap_coverage
            + self.progressive_difficulty * breakdown.progressive_difficulty
            + self.learning_style_match * breakdown.learning_style_match
    }
}

impl Default for AffinityWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Cosine of `knowledgeState` against the content's domain weights laid out
/// in `index` order.
pub fn knowledge_alignment(
    learner: &LearnerProfile,
    content: &ContentItem,
    index: &DomainIndex,
) -> Result<Similarity, AlgoError> {
    let domain_weights = index.flatten(&content.knowledge_domains);
    cosine_similarity(&learner.knowledge_state, &domain_weights)
}

/// Cosine of the learner's preferences against the content's teaching style.
pub fn learning_style_match(
    learner: &LearnerProfile,
    content: &ContentItem,
) -> Result<Similarity, AlgoError> {
    cosine_similarity(
        &learner.learning_preferences,
        &content.pedagogical_attributes,
    )
}

pub fn compute_affinity(
    learner: &LearnerProfile,
    content: &ContentItem,
    index: &DomainIndex,
) -> Result<AffinityBreakdown, AlgoError> {
    let alignment = knowledge_alignment(learner, content, index)?;
    let style = learning_style_match(learner, content)?;
    let patterns = &learner.learning_patterns;
    let gaps = gap_coverage(&patterns.concept_gaps, &content.knowledge_domains)?;
    let difficulty =
        progressive_difficulty(&patterns.historical_performance, &content.difficulty_vector)?;

    let mut degenerate = Vec::new();
    if alignment.degenerate {
        degenerate.push(Signal::KnowledgeAlignment);
    }
    if style.degenerate {
        degenerate.push(Signal::LearningStyleMatch);
    }

    let mut breakdown = AffinityBreakdown {
        knowledge_alignment: alignment.value,
        gap_coverage: gaps,
        progressive_difficulty: difficulty,
        learning_style_match: style.value,
        score: 0.0,
        degenerate,
    };

    let raw = AffinityWeights::STANDARD.blend(&breakdown);
    if !raw.is_finite() {
        return Err(AlgoError::NonFinite("affinity score"));
    }
    breakdown.score = clamp_unit(raw);

    Ok(breakdown)
}

/// Scores every content item in parallel and keeps the best `limit`,
/// highest score first. Ties keep the input order. Items that cannot be
/// scored against this learner are reported in `rejected`, never given a
/// default score.
pub fn rank_contents(
    learner: &LearnerProfile,
    contents: &[ContentItem],
    index: &DomainIndex,
    limit: usize,
) -> RankingOutcome {
    let scored: Vec<(String, Result<AffinityBreakdown, AlgoError>)> = contents
        .par_iter()
        .map(|content| (content.id.clone(), compute_affinity(learner, content, index)))
        .collect();

    let mut outcome = RankingOutcome::default();
    for (content_id, result) in scored {
        match result {
            Ok(affinity) => outcome.ranked.push(RankedContent {
                content_id,
                affinity,
            }),
            Err(err) => outcome.rejected.push((content_id, err)),
        }
    }

    outcome.ranked.sort_by(|a, b| {
        b.affinity
            .score
            .partial_cmp(&a.affinity.score)
            .unwrap_or(Ordering::Equal)
    });
    outcome.ranked.truncate(limit);

    outcome
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;
    use crate::types::PerformanceEntry;

    fn index() -> DomainIndex {
        DomainIndex::new(["math", "physics"])
    }

    fn example_learner() -> LearnerProfile {
        let mut learner = LearnerProfile::new("learner-1");
        learner.knowledge_state = vec![0.2, 0.8];
        learner
            .learning_patterns
            .concept_gaps
            .insert("math".to_string(), 0.9);
        learner.learning_preferences = vec![1.0, 0.0];
        learner
    }

    fn example_content() -> ContentItem {
        ContentItem {
            id: "content-1".to_string(),
            difficulty_vector: vec![0.5, 0.5],
            knowledge_domains: BTreeMap::from([("math".to_string(), 1.0)]),
            pedagogical_attributes: vec![1.0, 0.0],
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((AffinityWeights::default().total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_worked_example() {
        let breakdown = compute_affinity(&example_learner(), &example_content(), &index()).unwrap();

        assert_eq!(breakdown.progressive_difficulty, 0.5);
        assert!((breakdown.learning_style_match - 1.0).abs() < 1e-12);
        assert!((breakdown.gap_coverage - 0.9).abs() < 1e-12);

        // [0.2, 0.8] · [1, 0] / |[0.2, 0.8]|
        let alignment = 0.2 / (0.2f64.powi(2) + 0.8f64.powi(2)).sqrt();
        assert!((breakdown.knowledge_alignment - alignment).abs() < 1e-12);
        assert!((breakdown.score - (0.4 * alignment + 0.47)).abs() < 1e-12);
        assert!(breakdown.degenerate.is_empty());
    }

    #[test]
    fn test_zero_knowledge_state_is_flagged_not_failed() {
        let mut learner = example_learner();
        learner.knowledge_state = vec![0.0, 0.0];
        let breakdown = compute_affinity(&learner, &example_content(), &index()).unwrap();
        assert_eq!(breakdown.knowledge_alignment, 0.0);
        assert_eq!(breakdown.degenerate, vec![Signal::KnowledgeAlignment]);
        assert!((breakdown.score - 0.47).abs() < 1e-12);
    }

    #[test]
    fn test_huge_knowledge_state_scores_true_alignment() {
        let mut learner = example_learner();
        learner.knowledge_state = vec![1e200, 0.0];
        assert!(learner.validate(&index()).is_ok());

        let breakdown = compute_affinity(&learner, &example_content(), &index()).unwrap();
        assert!((breakdown.knowledge_alignment - 1.0).abs() < 1e-12);
        assert!(breakdown.degenerate.is_empty());
        assert!((breakdown.score - 0.87).abs() < 1e-12);
    }

    #[test]
    fn test_content_without_domains_is_degenerate() {
        let mut content = example_content();
        content.knowledge_domains.clear();
        let breakdown = compute_affinity(&example_learner(), &content, &index()).unwrap();
        assert_eq!(breakdown.gap_coverage, 0.0);
        assert_eq!(breakdown.degenerate, vec![Signal::KnowledgeAlignment]);
    }

    #[test]
    fn test_style_dimension_mismatch_is_error() {
        let mut content = example_content();
        content.pedagogical_attributes = vec![1.0, 0.0, 0.5];
        assert_eq!(
            compute_affinity(&example_learner(), &content, &index()),
            Err(AlgoError::LengthMismatch { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_knowledge_dimension_mismatch_is_error() {
        let wider = DomainIndex::new(["art", "math", "physics"]);
        assert!(matches!(
            compute_affinity(&example_learner(), &example_content(), &wider),
            Err(AlgoError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_rank_contents_orders_by_score() {
        let learner = example_learner();
        let aligned = example_content();
        let mut off_topic = example_content();
        off_topic.id = "content-2".to_string();
        off_topic.pedagogical_attributes = vec![0.0, 1.0];
        off_topic.knowledge_domains = BTreeMap::from([("physics".to_string(), 1.0)]);

        let outcome = rank_contents(&learner, &[off_topic, aligned], &index(), 10);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.ranked.len(), 2);
        assert_eq!(outcome.ranked[0].content_id, "content-1");
        assert!(outcome.ranked[0].affinity.score >= outcome.ranked[1].affinity.score);

        let top = rank_contents(&learner, &[example_content()], &index(), 0);
        assert!(top.ranked.is_empty());
    }

    #[test]
    fn test_rank_contents_reports_unscorable_items() {
        let learner = example_learner();
        let mut wide = example_content();
        wide.id = "wide".to_string();
        wide.pedagogical_attributes = vec![1.0, 0.0, 0.0];

        let outcome = rank_contents(&learner, &[wide, example_content()], &index(), 10);
        assert_eq!(outcome.ranked.len(), 1);
        assert_eq!(outcome.ranked[0].content_id, "content-1");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].0, "wide");
        assert!(matches!(outcome.rejected[0].1, AlgoError::LengthMismatch { .. }));
    }

    fn arb_unit() -> impl Strategy<Value = f64> {
        (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
    }

    fn arb_learner() -> impl Strategy<Value = LearnerProfile> {
        (
            prop::collection::vec(arb_unit(), 2),
            prop::collection::vec(arb_unit(), 3),
            arb_unit(),
            arb_unit(),
            prop::collection::vec(arb_unit(), 0..12),
        )
            .prop_map(|(knowledge_state, prefs, math_gap, physics_gap, scores)| {
                let mut learner = LearnerProfile::new("prop");
                learner.knowledge_state = knowledge_state;
                learner.learning_preferences = prefs;
                learner.learning_patterns.concept_gaps = BTreeMap::from([
                    ("math".to_string(), math_gap),
                    ("physics".to_string(), physics_gap),
                ]);
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
            prop::collection::vec(arb_unit(), 1..6),
            proptest::option::of(0.0f64..5.0),
            proptest::option::of(0.0f64..5.0),
            prop::collection::vec(arb_unit(), 3),
        )
            .prop_map(|(difficulty_vector, math, physics, pedagogical_attributes)| {
                let mut knowledge_domains = BTreeMap::new();
                if let Some(w) = math {
                    knowledge_domains.insert("math".to_string(), w);
                }
                if let Some(w) = physics {
                    knowledge_domains.insert("physics".to_string(), w);
                }
                ContentItem {
                    id: "prop".to_string(),
                    difficulty_vector,
                    knowledge_domains,
                    pedagogical_attributes,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded(learner in arb_learner(), content in arb_content()) {
            let breakdown = compute_affinity(&learner, &content, &index()).unwrap();
            prop_assert!((0.0..=1.0).contains(&breakdown.score));
            prop_assert!((0.0..=1.0).contains(&breakdown.progressive_difficulty));
            prop_assert!((0.0..=1.0).contains(&breakdown.gap_coverage));
        }
    }
}
