//! Gap coverage
//!
//! Weighted-average gap severity over the domains a content item covers:
//! `Σ gap[d]·w[d] / Σ w[d]`. Rewards content aimed at a learner's weakest
//! areas, in proportion to how central those areas are to the content.

use std::collections::BTreeMap;

use crate::error::AlgoError;
use crate::types::EPSILON;

pub fn gap_coverage(
    concept_gaps: &BTreeMap<String, f64>,
    knowledge_domains: &BTreeMap<String, f64>,
) -> Result<f64, AlgoError> {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;

    for (domain, &weight) in knowledge_domains {
        let gap = concept_gaps.get(domain).copied().unwrap_or(0.0);
        weighted += gap * weight;
        total_weight += weight;
    }

    if !weighted.is_finite() || !total_weight.is_finite() {
        return Err(AlgoError::NonFinite("gap coverage"));
    }
    if total_weight < EPSILON {
        return Ok(0.0);
    }

    Ok(weighted / total_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_empty_domains_is_zero() {
        let gaps = map(&[("math", 0.9)]);
        assert_eq!(gap_coverage(&gaps, &BTreeMap::new()).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_total_weight_is_zero() {
        let gaps = map(&[("math", 0.9)]);
        let domains = map(&[("math", 0.0), ("physics", 0.0)]);
        assert_eq!(gap_coverage(&gaps, &domains).unwrap(), 0.0);
    }

    #[test]
    fn test_full_gaps_equal_weights_is_one() {
        let gaps = map(&[("math", 1.0), ("physics", 1.0), ("art", 1.0)]);
        let domains = map(&[("math", 2.0), ("physics", 2.0), ("art", 2.0)]);
        assert!((gap_coverage(&gaps, &domains).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_gap_counts_as_zero() {
        let gaps = map(&[("math", 0.8)]);
        let domains = map(&[("math", 1.0), ("physics", 3.0)]);
        // (0.8*1 + 0*3) / 4
        assert!((gap_coverage(&gaps, &domains).unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_single_domain() {
        let gaps = map(&[("math", 0.9)]);
        let domains = map(&[("math", 1.0)]);
        assert!((gap_coverage(&gaps, &domains).unwrap() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let gaps = map(&[("math", 0.5)]);
        let domains = map(&[("math", f64::INFINITY)]);
        assert!(gap_coverage(&gaps, &domains).is_err());
    }
}
