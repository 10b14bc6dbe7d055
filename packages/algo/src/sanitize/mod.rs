//! Data Sanitization
//!
//! Numerical validity checks shared by the scoring functions and the
//! store-boundary validators.

use crate::error::AlgoError;

/// 检查数组是否包含无效值 (NaN 或 Inf)
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// 无效值直接报错，不做替换
pub fn ensure_finite(arr: &[f64], field: &'static str) -> Result<(), AlgoError> {
    if has_invalid_values(arr) {
        return Err(AlgoError::NonFinite(field));
    }
    Ok(())
}

/// 要求取值位于 [0, 1]
pub fn ensure_unit_interval(value: f64, field: &str) -> Result<(), AlgoError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(AlgoError::OutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// 截断到 [0, 1]
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// 算术平均，空输入返回 None
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== has_invalid_values 测试 ====================

    #[test]
    fn test_has_invalid_values_with_valid_array() {
        assert!(!has_invalid_values(&[1.0, 2.0, 3.0]));
        assert!(!has_invalid_values(&[0.0, -1.0, 1e10]));
        assert!(!has_invalid_values(&[])); // 空数组
    }

    #[test]
    fn test_has_invalid_values_with_nan() {
        assert!(has_invalid_values(&[1.0, f64::NAN, 3.0]));
        assert!(has_invalid_values(&[f64::NAN]));
    }

    #[test]
    fn test_has_invalid_values_with_infinity() {
        assert!(has_invalid_values(&[1.0, f64::INFINITY, 3.0]));
        assert!(has_invalid_values(&[f64::NEG_INFINITY, 2.0]));
    }

    // ==================== ensure_* 测试 ====================

    #[test]
    fn test_ensure_finite_reports_field() {
        assert_eq!(
            ensure_finite(&[0.1, f64::NAN], "knowledgeState"),
            Err(AlgoError::NonFinite("knowledgeState"))
        );
        assert!(ensure_finite(&[0.1, 0.2], "knowledgeState").is_ok());
    }

    #[test]
    fn test_ensure_unit_interval_bounds() {
        assert!(ensure_unit_interval(0.0, "score").is_ok());
        assert!(ensure_unit_interval(1.0, "score").is_ok());
        assert!(ensure_unit_interval(-0.01, "score").is_err());
        assert!(ensure_unit_interval(1.01, "score").is_err());
        assert!(ensure_unit_interval(f64::NAN, "score").is_err());
    }

    // ==================== clamp_unit / mean 测试 ====================

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.3), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
        assert_eq!(clamp_unit(1.7), 1.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean(vec![0.5]), Some(0.5));
        assert!((mean(vec![0.2, 0.4, 0.6]).unwrap() - 0.4).abs() < 1e-12);
    }
}
