//! Progressive difficulty estimator
//!
//! Shifts a content item's difficulty vector by the learner's recent trend
//! (mean of the last [`RECENT_PERFORMANCE_WINDOW`] scores, pivoting at
//! [`PERFORMANCE_PIVOT`], capped at ±[`MAX_DIFFICULTY_ADJUSTMENT`]) and
//! returns the mean of the adjusted, clamped components. The result is a
//! calibrated difficulty-fit estimate on the same [0, 1] scale as the other
//! signals, not a similarity.

use crate::error::AlgoError;
use crate::sanitize::{clamp_unit, ensure_finite, mean};
use crate::types::{
    PerformanceEntry, MAX_DIFFICULTY_ADJUSTMENT, NEUTRAL_DIFFICULTY, PERFORMANCE_PIVOT,
    RECENT_PERFORMANCE_WINDOW,
};

/// Shift derived from the most recent scores; `None` when there is no history.
pub fn difficulty_adjustment(history: &[PerformanceEntry]) -> Option<f64> {
    let start = history.len().saturating_sub(RECENT_PERFORMANCE_WINDOW);
    let avg = mean(history[start..].iter().map(|entry| entry.score))?;
    Some((avg - PERFORMANCE_PIVOT).clamp(-MAX_DIFFICULTY_ADJUSTMENT, MAX_DIFFICULTY_ADJUSTMENT))
}

/// `history` must be chronological (oldest first).
pub fn progressive_difficulty(
    history: &[PerformanceEntry],
    difficulty_vector: &[f64],
) -> Result<f64, AlgoError> {
    let Some(adjustment) = difficulty_adjustment(history) else {
        return Ok(NEUTRAL_DIFFICULTY);
    };
    if !adjustment.is_finite() {
        return Err(AlgoError::NonFinite("historicalPerformance"));
    }
    ensure_finite(difficulty_vector, "difficultyVector")?;

    mean(
        difficulty_vector
            .iter()
            .map(|&component| clamp_unit(component + adjustment)),
    )
    .ok_or(AlgoError::EmptyVector("difficultyVector"))
}
