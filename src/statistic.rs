//! Modified KPSS statistic for near-integrated nulls.
//!
//! The series is first quasi-differenced at the boundary value `c̄`,
//! `u_t = y_t - ρ̄ y_{t-1}` with `ρ̄ = 1 - c̄/T`, and the ordinary KPSS statistic
//! is computed on `u`:
//!
//! ```text
//! η = Σ S_t² / (n² ω̂²),   S_t = e_1 + ... + e_t
//! ```
//!
//! where `e` are the residuals of `u` on a constant (or constant and trend) and
//! `ω̂²` is a kernel long-run variance of `e`. When the true local-to-unity
//! parameter equals `c̄`, `u` is the innovation sequence and `η` has the
//! standard KPSS null distribution, so decisions use the Kwiatkowski et al.
//! (1992) critical values.

use crate::config::Detrend;
use crate::errors::{
    validate_all_finite, validate_data_length, validate_finite, HarnessError, HarnessResult,
};
use crate::long_run_variance::{long_run_variance, LongRunVarianceConfig};
use crate::math_utils::{detrend_residuals, partial_sums};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum sample length accepted by the statistic.
pub const MIN_OBSERVATIONS: usize = 20;

/// Kwiatkowski et al. (1992) level-stationarity critical values,
/// `(significance, critical value)`, strictest level first.
pub const KPSS_LEVEL_CRITICAL_VALUES: [(f64, f64); 4] =
    [(0.01, 0.739), (0.025, 0.574), (0.05, 0.463), (0.10, 0.347)];

/// Kwiatkowski et al. (1992) trend-stationarity critical values.
pub const KPSS_TREND_CRITICAL_VALUES: [(f64, f64); 4] =
    [(0.01, 0.216), (0.025, 0.176), (0.05, 0.146), (0.10, 0.119)];

/// Reference critical values for a deterministic specification.
pub fn kpss_critical_values(detrend: Detrend) -> [(f64, f64); 4] {
    match detrend {
        Detrend::Constant => KPSS_LEVEL_CRITICAL_VALUES,
        Detrend::ConstantTrend => KPSS_TREND_CRITICAL_VALUES,
    }
}

/// Reference critical value at `significance` (one of 0.01, 0.025, 0.05, 0.10).
pub fn kpss_critical_value(detrend: Detrend, significance: f64) -> Option<f64> {
    kpss_critical_values(detrend)
        .iter()
        .find(|(level, _)| (level - significance).abs() < 1e-12)
        .map(|&(_, cv)| cv)
}

/// P-value by linear interpolation in the critical-value table.
///
/// Values beyond the table are clamped to `[0.01, 0.10]`.
pub fn kpss_p_value(statistic: f64, detrend: Detrend) -> f64 {
    let table = kpss_critical_values(detrend);
    let (p_min, cv_max) = table[0];
    let (p_max, cv_min) = table[table.len() - 1];

    if statistic >= cv_max {
        return p_min;
    }
    if statistic <= cv_min {
        return p_max;
    }

    for pair in table.windows(2) {
        let (p_lo, cv_hi) = pair[0];
        let (p_hi, cv_lo) = pair[1];
        if statistic <= cv_hi && statistic >= cv_lo {
            return p_lo + (p_hi - p_lo) * (cv_hi - statistic) / (cv_hi - cv_lo);
        }
    }
    p_max
}

/// Outcome of one modified KPSS evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TestResult {
    /// `η`
    pub statistic: f64,
    /// Interpolated p-value, when requested
    pub p_value: Option<f64>,
    pub reject_1pct: bool,
    pub reject_5pct: bool,
    pub reject_10pct: bool,
    /// Kernel bandwidth used for `ω̂²`
    pub bandwidth: f64,
    /// Observations after quasi-differencing, `T - 1`
    pub n_obs: usize,
    /// `(significance, critical value)` pairs the decisions were taken against
    pub critical_values: [(f64, f64); 4],
}

/// Full configuration of the statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModifiedKpssConfig {
    /// Boundary local-to-unity value
    pub c_bar: f64,
    pub detrend: Detrend,
    /// Long-run variance estimator
    pub lrv: LongRunVarianceConfig,
    /// Whether to compute the interpolated p-value
    pub compute_pvalue: bool,
}

impl Default for ModifiedKpssConfig {
    fn default() -> Self {
        Self {
            c_bar: 10.0,
            detrend: Detrend::Constant,
            lrv: LongRunVarianceConfig::default(),
            compute_pvalue: true,
        }
    }
}

/// Quasi-difference `y` at `ρ̄ = 1 - c̄/T`, dropping the first observation.
pub fn quasi_difference(y: &[f64], c_bar: f64) -> Vec<f64> {
    let rho_bar = 1.0 - c_bar / y.len() as f64;
    y.windows(2).map(|w| w[1] - rho_bar * w[0]).collect()
}

/// Level-case modified KPSS test with the default long-run variance estimator.
pub fn modified_kpss_test(y: &[f64], c_bar: f64, compute_pvalue: bool) -> HarnessResult<TestResult> {
    let config = ModifiedKpssConfig {
        c_bar,
        compute_pvalue,
        ..ModifiedKpssConfig::default()
    };
    modified_kpss_test_with_config(y, &config)
}

/// Modified KPSS test with explicit configuration.
///
/// # Errors
/// * `InsufficientData` for fewer than [`MIN_OBSERVATIONS`] points
/// * `InvalidParameter` for `c̄` outside `[0, T)`
/// * `NumericalError` for non-finite data or a degenerate long-run variance
pub fn modified_kpss_test_with_config(
    y: &[f64],
    config: &ModifiedKpssConfig,
) -> HarnessResult<TestResult> {
    validate_data_length(y, MIN_OBSERVATIONS)?;
    let t = y.len();
    validate_all_finite(y, "y")?;
    validate_finite(config.c_bar, "c_bar")?;
    if config.c_bar < 0.0 || config.c_bar >= t as f64 {
        return Err(HarnessError::InvalidParameter {
            parameter: "c_bar".to_string(),
            value: config.c_bar,
            constraint: format!("[0, {})", t),
        });
    }

    let u = quasi_difference(y, config.c_bar);
    let residuals = detrend_residuals(&u, config.detrend)?;
    let n = residuals.len();

    let numerator: f64 = partial_sums(&residuals).iter().map(|s| s * s).sum();
    let lrv = long_run_variance(&residuals, &config.lrv)?;
    let statistic = numerator / ((n * n) as f64 * lrv.variance);

    if !statistic.is_finite() {
        return Err(HarnessError::numerical(
            "modified_kpss_test",
            format!("non-finite statistic (omega^2 = {})", lrv.variance),
        ));
    }

    let critical_values = kpss_critical_values(config.detrend);
    let cv_at = |level: f64| {
        critical_values
            .iter()
            .find(|(l, _)| (*l - level).abs() < 1e-12)
            .map_or(f64::INFINITY, |&(_, cv)| cv)
    };

    Ok(TestResult {
        statistic,
        p_value: config
            .compute_pvalue
            .then(|| kpss_p_value(statistic, config.detrend)),
        reject_1pct: statistic > cv_at(0.01),
        reject_5pct: statistic > cv_at(0.05),
        reject_10pct: statistic > cv_at(0.10),
        bandwidth: lrv.bandwidth,
        n_obs: n,
        critical_values,
    })
}

/// Statistic computed on each simulated path.
pub trait StatisticEvaluator: Send + Sync {
    /// Evaluate the statistic on `path` at boundary `c_bar`.
    fn evaluate(&self, path: &[f64], c_bar: f64, detrend: Detrend) -> HarnessResult<TestResult>;
}

/// [`StatisticEvaluator`] for the modified KPSS statistic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModifiedKpss {
    /// Long-run variance estimator
    pub lrv: LongRunVarianceConfig,
}

impl ModifiedKpss {
    pub fn new(lrv: LongRunVarianceConfig) -> Self {
        Self { lrv }
    }
}

impl StatisticEvaluator for ModifiedKpss {
    fn evaluate(&self, path: &[f64], c_bar: f64, detrend: Detrend) -> HarnessResult<TestResult> {
        // p-values are never needed inside the replication loop
        let config = ModifiedKpssConfig {
            c_bar,
            detrend,
            lrv: self.lrv,
            compute_pvalue: false,
        };
        modified_kpss_test_with_config(path, &config)
    }
}
