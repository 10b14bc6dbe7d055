//! Vector similarity primitive

use serde::{Deserialize, Serialize};

use crate::error::AlgoError;
use crate::sanitize::ensure_finite;
use crate::types::EPSILON;

/// Cosine similarity result.
///
/// `degenerate` is set when either vector has zero norm; `value` is then 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub value: f64,
    pub degenerate: bool,
}

impl Similarity {
    const DEGENERATE: Self = Self {
        value: 0.0,
        degenerate: true,
    };
}

/// `a·b / (‖a‖·‖b‖)`, clamped to [-1, 1].
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<Similarity, AlgoError> {
    if a.len() != b.len() {
        return Err(AlgoError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(AlgoError::EmptyVector("similarity input"));
    }
    ensure_finite(a, "similarity input")?;
    ensure_finite(b, "similarity input")?;

    // Each side is divided by its largest magnitude so the squares cannot overflow.
    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a < EPSILON || scale_b < EPSILON {
        return Ok(Similarity::DEGENERATE);
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x / scale_a) * (y / scale_b))
        .sum();
    let unit_norm_a = scaled_norm(a, scale_a);
    let unit_norm_b = scaled_norm(b, scale_b);
    if unit_norm_a * scale_a < EPSILON || unit_norm_b * scale_b < EPSILON {
        return Ok(Similarity::DEGENERATE);
    }

    let value = dot / (unit_norm_a * unit_norm_b);
    if !value.is_finite() {
        return Err(AlgoError::NonFinite("cosine similarity"));
    }

    Ok(Similarity {
        value: value.clamp(-1.0, 1.0),
        degenerate: false,
    })
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

fn scaled_norm(v: &[f64], scale: f64) -> f64 {
    v.iter().map(|x| (x / scale).powi(2)).sum::<f64>().sqrt()
}
