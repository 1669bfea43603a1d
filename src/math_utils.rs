//! Numerical helpers shared by the statistic and the harness.
//!
//! Order statistics, percentiles with linear interpolation, deterministic
//! regressions on a constant or a constant and linear trend, and a few
//! moment helpers.

use crate::config::Detrend;
use crate::errors::{HarnessError, HarnessResult};

/// Total order on `f64` that sorts NaN after every number.
pub fn float_total_cmp(a: &f64, b: &f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.total_cmp(b),
    }
}

/// Sorted copy of the finite values in `values` and the number of values
/// that were excluded (NaN sentinels or infinities).
pub fn sorted_finite(values: &[f64]) -> (Vec<f64>, usize) {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let excluded = values.len() - sorted.len();
    sorted.sort_unstable_by(float_total_cmp);
    (sorted, excluded)
}

/// Quantile of sorted data by linear interpolation between order statistics.
///
/// With `h = p (n - 1)` the result is
/// `x[floor(h)] + (h - floor(h)) (x[floor(h) + 1] - x[floor(h)])`.
/// This is Hyndman-Fan type 7, the default of R and NumPy. `p` is clamped to
/// `[0, 1]`; an empty slice yields NaN.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let p = p.clamp(0.0, 1.0);
    let n = sorted.len();
    let h = p * (n - 1) as f64;
    let lower = h.floor() as usize;
    let frac = h - lower as f64;

    if lower + 1 < n {
        sorted[lower] + frac * (sorted[lower + 1] - sorted[lower])
    } else {
        sorted[n - 1]
    }
}

/// Percentile (`0..=100`) of unsorted data, ignoring non-finite values.
pub fn percentile(values: &[f64], pct: f64) -> HarnessResult<f64> {
    if !(0.0..=100.0).contains(&pct) {
        return Err(HarnessError::InvalidParameter {
            parameter: "percentile".to_string(),
            value: pct,
            constraint: "[0, 100]".to_string(),
        });
    }
    let (sorted, _) = sorted_finite(values);
    if sorted.is_empty() {
        return Err(HarnessError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(quantile_sorted(&sorted, pct / 100.0))
}

/// Fraction of finite values strictly greater than `threshold`.
///
/// The denominator is the full sample length, so NaN sentinels count as
/// non-rejections instead of shrinking the sample.
pub fn fraction_exceeding(values: &[f64], threshold: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let count = values
        .iter()
        .filter(|v| v.is_finite() && **v > threshold)
        .count();
    count as f64 / values.len() as f64
}

/// Arithmetic mean; NaN for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with `n - 1` denominator; NaN for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// OLS residuals of `y` on the deterministic regressors of `detrend`.
///
/// The trend regressor is `t = 1..n`; it is centred before solving so the
/// two-regressor case reduces to two decoupled sums.
pub fn detrend_residuals(y: &[f64], detrend: Detrend) -> HarnessResult<Vec<f64>> {
    let n = y.len();
    let required = detrend.num_regressors() + 1;
    if n < required {
        return Err(HarnessError::InsufficientData {
            required,
            actual: n,
        });
    }

    let y_mean = mean(y);
    match detrend {
        Detrend::Constant => Ok(y.iter().map(|v| v - y_mean).collect()),
        Detrend::ConstantTrend => {
            let t_mean = (n as f64 + 1.0) / 2.0;
            let mut sxy = 0.0;
            let mut sxx = 0.0;
            for (i, &v) in y.iter().enumerate() {
                let t = (i + 1) as f64 - t_mean;
                sxy += t * (v - y_mean);
                sxx += t * t;
            }
            if sxx <= 0.0 {
                return Err(HarnessError::numerical(
                    "detrend_residuals",
                    "trend regressor has zero variance",
                ));
            }
            let slope = sxy / sxx;
            Ok(y
                .iter()
                .enumerate()
                .map(|(i, &v)| v - y_mean - slope * ((i + 1) as f64 - t_mean))
                .collect())
        }
    }
}

/// Running partial sums `S_t = e_1 + ... + e_t`.
pub fn partial_sums(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn one_to_hundred() -> Vec<f64> {
        (1..=100).map(|v| v as f64).collect()
    }

    #[test]
    fn test_percentile_known_values() {
        let data = one_to_hundred();
        assert_approx_eq!(percentile(&data, 95.0).unwrap(), 95.05, 1e-10);
        assert_approx_eq!(percentile(&data, 99.0).unwrap(), 99.01, 1e-10);
        assert_approx_eq!(percentile(&data, 90.0).unwrap(), 90.1, 1e-10);
        assert_approx_eq!(percentile(&data, 50.0).unwrap(), 50.5, 1e-10);
        assert_eq!(percentile(&data, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&data, 100.0).unwrap(), 100.0);
    }

    #[test]
    fn test_percentile_ignores_order_and_nan() {
        let mut data = one_to_hundred();
        data.reverse();
        data.push(f64::NAN);
        // NaN is excluded from the order statistics
        assert_approx_eq!(percentile(&data, 95.0).unwrap(), 95.05, 1e-10);
        let (_, excluded) = sorted_finite(&data);
        assert_eq!(excluded, 1);
    }

    #[test]
    fn test_percentile_rejects_bad_input() {
        assert!(percentile(&[1.0], 101.0).is_err());
        assert!(matches!(
            percentile(&[f64::NAN], 50.0),
            Err(HarnessError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_quantile_single_value() {
        assert_eq!(quantile_sorted(&[3.0], 0.95), 3.0);
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn test_fraction_exceeding_is_strict() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(fraction_exceeding(&data, 2.0), 0.5);
        assert_eq!(fraction_exceeding(&data, 4.0), 0.0);
        assert_eq!(fraction_exceeding(&[f64::NAN, 5.0], 1.0), 0.5);
    }

    #[test]
    fn test_detrend_constant() {
        let residuals = detrend_residuals(&[1.0, 2.0, 3.0], Detrend::Constant).unwrap();
        assert_approx_eq!(residuals[0], -1.0, 1e-12);
        assert_approx_eq!(residuals.iter().sum::<f64>(), 0.0, 1e-12);
    }

    #[test]
    fn test_detrend_removes_exact_trend() {
        let y: Vec<f64> = (0..50).map(|t| 3.0 + 0.5 * t as f64).collect();
        let residuals = detrend_residuals(&y, Detrend::ConstantTrend).unwrap();
        for r in residuals {
            assert_approx_eq!(r, 0.0, 1e-9);
        }
    }

    #[test]
    fn test_partial_sums_and_moments() {
        assert_eq!(partial_sums(&[1.0, -2.0, 3.0]), vec![1.0, -1.0, 2.0]);
        assert_approx_eq!(mean(&[1.0, 2.0, 3.0]), 2.0, 1e-12);
        assert_approx_eq!(sample_variance(&[1.0, 2.0, 3.0]), 1.0, 1e-12);
        assert!(sample_variance(&[1.0]).is_nan());
    }
}
