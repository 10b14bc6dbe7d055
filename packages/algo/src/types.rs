//! Common Types and Constants
//!
//! Shared data structures used across all scoring modules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::DomainIndex;
use crate::error::AlgoError;
use crate::sanitize::{ensure_finite, ensure_unit_interval};

// ==================== Constants ====================

/// Weight of the knowledge-alignment signal
pub const WEIGHT_KNOWLEDGE_ALIGNMENT: f64 = 0.4;

/// Weight of the gap-coverage signal
pub const WEIGHT_GAP_COVERAGE: f64 = 0.3;

/// Weight of the progressive-difficulty signal
pub const WEIGHT_PROGRESSIVE_DIFFICULTY: f64 = 0.2;

/// Weight of the learning-style signal
pub const WEIGHT_LEARNING_STYLE: f64 = 0.1;

/// Number of most recent performance entries considered
pub const RECENT_PERFORMANCE_WINDOW: usize = 5;

/// Maximum absolute difficulty shift derived from recent performance
pub const MAX_DIFFICULTY_ADJUSTMENT: f64 = 0.2;

/// Performance level at which no difficulty shift is applied
pub const PERFORMANCE_PIVOT: f64 = 0.5;

/// Progressive difficulty returned when there is no history
pub const NEUTRAL_DIFFICULTY: f64 = 0.5;

/// Norm below which a vector is treated as zero
pub const EPSILON: f64 = 1e-10;

// ==================== Learner Types ====================

/// One answered content unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    /// Score in [0, 1]
    pub score: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningPatterns {
    pub response_times: Vec<f64>,
    pub concept_strengths: BTreeMap<String, f64>,
    /// Gap severity per domain in [0, 1]; missing domains count as 0
    pub concept_gaps: BTreeMap<String, f64>,
    /// Chronological, oldest first
    pub historical_performance: Vec<PerformanceEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub id: String,
    /// One slot per [`DomainIndex`] entry
    pub knowledge_state: Vec<f64>,
    #[serde(default)]
    pub learning_patterns: LearningPatterns,
    /// Same dimensionality as [`ContentItem::pedagogical_attributes`]
    pub learning_preferences: Vec<f64>,
}

impl LearnerProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            knowledge_state: Vec::new(),
            learning_patterns: LearningPatterns::default(),
            learning_preferences: Vec::new(),
        }
    }

    /// Stable-sorts the performance history so the tail holds the newest entries.
    pub fn normalize(&mut self) {
        self.learning_patterns
            .historical_performance
            .sort_by_key(|entry| entry.timestamp);
    }

    pub fn validate(&self, index: &DomainIndex) -> Result<(), AlgoError> {
        if self.knowledge_state.is_empty() {
            return Err(AlgoError::EmptyVector("knowledgeState"));
        }
        if self.knowledge_state.len() != index.len() {
            return Err(AlgoError::LengthMismatch {
                left: self.knowledge_state.len(),
                right: index.len(),
            });
        }
        ensure_finite(&self.knowledge_state, "knowledgeState")?;

        if self.learning_preferences.is_empty() {
            return Err(AlgoError::EmptyVector("learningPreferences"));
        }
        ensure_finite(&self.learning_preferences, "learningPreferences")?;

        let patterns = &self.learning_patterns;
        ensure_finite(&patterns.response_times, "responseTimes")?;
        for (domain, strength) in &patterns.concept_strengths {
            index.require(domain)?;
            ensure_finite(&[*strength], "conceptStrengths")?;
        }
        for (domain, gap) in &patterns.concept_gaps {
            index.require(domain)?;
            ensure_unit_interval(*gap, "conceptGaps")?;
        }
        for entry in &patterns.historical_performance {
            ensure_unit_interval(entry.score, "historicalPerformance.score")?;
        }

        Ok(())
    }
}

// ==================== Content Types ====================

/// Authored quiz/content unit, immutable once stored
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    /// Components in [0, 1]
    pub difficulty_vector: Vec<f64>,
    /// Domain name -> non-negative weight
    #[serde(default)]
    pub knowledge_domains: BTreeMap<String, f64>,
    pub pedagogical_attributes: Vec<f64>,
}

impl ContentItem {
    pub fn validate(&self, index: &DomainIndex) -> Result<(), AlgoError> {
        if self.difficulty_vector.is_empty() {
            return Err(AlgoError::EmptyVector("difficultyVector"));
        }
        for &component in &self.difficulty_vector {
            ensure_unit_interval(component, "difficultyVector")?;
        }

        for (domain, &weight) in &self.knowledge_domains {
            index.require(domain)?;
            ensure_finite(&[weight], "knowledgeDomains")?;
            if weight < 0.0 {
                return Err(AlgoError::OutOfRange {
                    field: format!("knowledgeDomains.{domain}"),
                    value: weight,
                });
            }
        }

        if self.pedagogical_attributes.is_empty() {
            return Err(AlgoError::EmptyVector("pedagogicalAttributes"));
        }
        ensure_finite(&self.pedagogical_attributes, "pedagogicalAttributes")?;

        Ok(())
    }
}

// ==================== Affinity Types ====================

/// Component signals of an affinity score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Signal {
    KnowledgeAlignment,
    LearningStyleMatch,
}

/// Affinity score with the signals it was blended from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffinityBreakdown {
    pub knowledge_alignment: f64,
    pub gap_coverage: f64,
    pub progressive_difficulty: f64,
    pub learning_style_match: f64,
    /// Weighted blend, clamped to [0, 1]
    pub score: f64,
    /// Signals that hit a zero-norm vector and were scored as 0
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degenerate: Vec<Signal>,
}

/// Ranked recommendation entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedContent {
    pub content_id: String,
    pub affinity: AffinityBreakdown,
}

/// Result of ranking a batch of content items for one learner
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankingOutcome {
    /// Best first, at most `limit` entries
    pub ranked: Vec<RankedContent>,
    /// Items that could not be scored, with the reason
    pub rejected: Vec<(String, AlgoError)>,
}
