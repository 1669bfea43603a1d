//! Kernel long-run variance estimation.
//!
//! `ω̂² = γ(0) + 2 Σ_{j≥1} k(j / b) γ(j)` for a kernel `k` and bandwidth `b`.
//! Supported kernels are Bartlett (Newey-West), Parzen and the quadratic
//! spectral kernel. The bandwidth is either fixed, a Schwert-style lag rule, or
//! the Andrews (1991) AR(1) plug-in.

use crate::errors::{HarnessError, HarnessResult};
use crate::fft_ops::{direct_autocovariances, fft_autocovariances};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Above this many lags the autocovariances are computed by FFT.
const FFT_LAG_THRESHOLD: usize = 64;

/// Bound on the AR(1) coefficient used by the plug-in bandwidth.
const MAX_PLUGIN_RHO: f64 = 0.97;

/// HAC taper family.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kernel {
    /// Triangular kernel, compact support on `|x| ≤ 1`
    Bartlett,
    /// Parzen kernel, compact support on `|x| ≤ 1`
    Parzen,
    /// Quadratic spectral kernel, infinite support
    QuadraticSpectral,
}

impl Kernel {
    /// Kernel weight `k(x)`.
    pub fn weight(&self, x: f64) -> f64 {
        let ax = x.abs();
        match self {
            Kernel::Bartlett => {
                if ax <= 1.0 {
                    1.0 - ax
                } else {
                    0.0
                }
            }
            Kernel::Parzen => {
                if ax <= 0.5 {
                    1.0 - 6.0 * ax * ax + 6.0 * ax * ax * ax
                } else if ax <= 1.0 {
                    2.0 * (1.0 - ax).powi(3)
                } else {
                    0.0
                }
            }
            Kernel::QuadraticSpectral => {
                if ax == 0.0 {
                    return 1.0;
                }
                let z = 6.0 * std::f64::consts::PI * ax / 5.0;
                3.0 / (z * z) * (z.sin() / z - z.cos())
            }
        }
    }

    /// Largest lag with a non-zero weight at bandwidth `b`, capped at `n - 1`.
    fn max_lag(&self, bandwidth: f64, n: usize) -> usize {
        match self {
            Kernel::QuadraticSpectral => n - 1,
            Kernel::Bartlett | Kernel::Parzen => (bandwidth.ceil() as usize).min(n - 1),
        }
    }
}

/// Bandwidth selection rule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BandwidthRule {
    /// Fixed bandwidth `b`
    Fixed(f64),
    /// `b = ⌊multiplier · (n/100)^{1/4}⌋ + 1`
    Schwert {
        /// 4 for the short rule, 12 for the long rule
        multiplier: f64,
    },
    /// Andrews (1991) AR(1) plug-in
    Andrews,
}

/// Kernel and bandwidth used by the long-run variance estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LongRunVarianceConfig {
    /// Kernel taper
    pub kernel: Kernel,
    /// Bandwidth rule
    pub bandwidth: BandwidthRule,
}

impl Default for LongRunVarianceConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel::QuadraticSpectral,
            bandwidth: BandwidthRule::Andrews,
        }
    }
}

impl std::fmt::Display for LongRunVarianceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kernel = match self.kernel {
            Kernel::Bartlett => "Bartlett",
            Kernel::Parzen => "Parzen",
            Kernel::QuadraticSpectral => "quadratic spectral",
        };
        match self.bandwidth {
            BandwidthRule::Fixed(b) => write!(f, "{} kernel, bandwidth {}", kernel, b),
            BandwidthRule::Schwert { multiplier } => {
                write!(f, "{} kernel, Schwert l{} bandwidth", kernel, multiplier)
            }
            BandwidthRule::Andrews => write!(f, "{} kernel, Andrews bandwidth", kernel),
        }
    }
}

/// Estimated long-run variance and the bandwidth that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongRunVariance {
    /// `ω̂²`
    pub variance: f64,
    /// Bandwidth `b` actually used
    pub bandwidth: f64,
}

/// First-order autocorrelation used by the plug-in rule, clamped away from ±1.
fn ar1_coefficient(residuals: &[f64]) -> f64 {
    let (num, den) = residuals
        .windows(2)
        .fold((0.0, 0.0), |(num, den), w| (num + w[1] * w[0], den + w[0] * w[0]));
    if den <= 0.0 {
        return 0.0;
    }
    (num / den).clamp(-MAX_PLUGIN_RHO, MAX_PLUGIN_RHO)
}

/// Resolve a bandwidth rule for `residuals` under `kernel`.
pub fn select_bandwidth(kernel: Kernel, rule: BandwidthRule, residuals: &[f64]) -> f64 {
    let n = residuals.len() as f64;
    match rule {
        BandwidthRule::Fixed(b) => b,
        BandwidthRule::Schwert { multiplier } => {
            (multiplier * (n / 100.0).powf(0.25)).floor() + 1.0
        }
        BandwidthRule::Andrews => {
            let rho = ar1_coefficient(residuals);
            match kernel {
                Kernel::Bartlett => {
                    let a1 = 4.0 * rho * rho / ((1.0 - rho).powi(2) * (1.0 + rho).powi(2));
                    1.1447 * (a1 * n).powf(1.0 / 3.0)
                }
                Kernel::Parzen => {
                    let a2 = 4.0 * rho * rho / (1.0 - rho).powi(4);
                    2.6614 * (a2 * n).powf(0.2)
                }
                Kernel::QuadraticSpectral => {
                    let a2 = 4.0 * rho * rho / (1.0 - rho).powi(4);
                    1.3221 * (a2 * n).powf(0.2)
                }
            }
        }
    }
}

/// Kernel long-run variance of mean-zero residuals.
///
/// # Errors
/// `InsufficientData` below two observations, `InvalidParameter` for a
/// negative or non-finite fixed bandwidth, and `NumericalError` when the
/// estimate is not strictly positive and finite.
pub fn long_run_variance(
    residuals: &[f64],
    config: &LongRunVarianceConfig,
) -> HarnessResult<LongRunVariance> {
    let n = residuals.len();
    if n < 2 {
        return Err(HarnessError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let bandwidth = select_bandwidth(config.kernel, config.bandwidth, residuals);
    if !bandwidth.is_finite() || bandwidth < 0.0 {
        return Err(HarnessError::InvalidParameter {
            parameter: "bandwidth".to_string(),
            value: bandwidth,
            constraint: "finite and non-negative".to_string(),
        });
    }

    // A vanishing bandwidth leaves only the lag-zero term.
    let max_lag = if bandwidth < 1e-8 {
        0
    } else {
        config.kernel.max_lag(bandwidth, n)
    };

    let gamma = if max_lag > FFT_LAG_THRESHOLD {
        fft_autocovariances(residuals, max_lag)?
    } else {
        direct_autocovariances(residuals, max_lag)
    };

    let weighted: f64 = gamma
        .iter()
        .enumerate()
        .skip(1)
        .map(|(j, g)| config.kernel.weight(j as f64 / bandwidth) * g)
        .sum();
    let variance = gamma[0] + 2.0 * weighted;

    if !variance.is_finite() || variance <= 0.0 {
        return Err(HarnessError::numerical(
            "long_run_variance",
            format!(
                "degenerate long-run variance {} (bandwidth {:.3}, n = {})",
                variance, bandwidth, n
            ),
        ));
    }

    Ok(LongRunVariance {
        variance,
        bandwidth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimulationRng;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_kernel_weights() {
        for kernel in [Kernel::Bartlett, Kernel::Parzen, Kernel::QuadraticSpectral] {
            assert_eq!(kernel.weight(0.0), 1.0);
        }
        assert_approx_eq!(Kernel::Bartlett.weight(0.25), 0.75, 1e-12);
        assert_eq!(Kernel::Bartlett.weight(1.5), 0.0);
        assert_approx_eq!(Kernel::Parzen.weight(0.5), 0.25, 1e-12);
        assert_eq!(Kernel::Parzen.weight(1.2), 0.0);
        // QS is continuous at the origin
        assert_approx_eq!(Kernel::QuadraticSpectral.weight(1e-4), 1.0, 1e-6);
    }

    #[test]
    fn test_config_display_names_estimator() {
        assert_eq!(
            LongRunVarianceConfig::default().to_string(),
            "quadratic spectral kernel, Andrews bandwidth"
        );
        let schwert = LongRunVarianceConfig {
            kernel: Kernel::Bartlett,
            bandwidth: BandwidthRule::Schwert { multiplier: 4.0 },
        };
        assert_eq!(schwert.to_string(), "Bartlett kernel, Schwert l4 bandwidth");
    }

    #[test]
    fn test_white_noise_lrv_near_variance() {
        let mut rng = SimulationRng::with_seed(3);
        let data: Vec<f64> = (0..4000).map(|_| rng.standard_normal()).collect();
        let lrv = long_run_variance(&data, &LongRunVarianceConfig::default()).unwrap();
        assert!((lrv.variance - 1.0).abs() < 0.15, "lrv = {}", lrv.variance);
    }

    #[test]
    fn test_ma1_lrv_tracks_spectrum() {
        // v_t = e_t + 0.5 e_{t-1} has long-run variance (1.5)^2 = 2.25
        let mut rng = SimulationRng::with_seed(11);
        let eps: Vec<f64> = (0..8001).map(|_| rng.standard_normal()).collect();
        let v: Vec<f64> = eps.windows(2).map(|w| w[1] + 0.5 * w[0]).collect();
        let m = v.iter().sum::<f64>() / v.len() as f64;
        let centred: Vec<f64> = v.iter().map(|x| x - m).collect();
        let lrv = long_run_variance(&centred, &LongRunVarianceConfig::default()).unwrap();
        assert!((lrv.variance - 2.25).abs() < 0.35, "lrv = {}", lrv.variance);
    }

    #[test]
    fn test_fixed_bartlett_matches_hand_computation() {
        let data = [1.0, -1.0, 1.0, -1.0];
        let config = LongRunVarianceConfig {
            kernel: Kernel::Bartlett,
            bandwidth: BandwidthRule::Fixed(2.0),
        };
        // γ0 = 1, γ1 = -0.75, weight 0.5 at lag 1, zero weight at lag 2
        let lrv = long_run_variance(&data, &config).unwrap();
        assert_approx_eq!(lrv.variance, 0.25, 1e-12);
        assert_eq!(lrv.bandwidth, 2.0);

        let data = [1.0, 2.0, -1.0, -2.0];
        let gamma = direct_autocovariances(&data, 1);
        let expected = gamma[0] + 2.0 * 0.5 * gamma[1];
        let lrv = long_run_variance(&data, &config).unwrap();
        assert_approx_eq!(lrv.variance, expected, 1e-12);
    }

    #[test]
    fn test_schwert_rule() {
        let data = vec![0.0; 100];
        let b = select_bandwidth(
            Kernel::Bartlett,
            BandwidthRule::Schwert { multiplier: 4.0 },
            &data,
        );
        assert_eq!(b, 5.0);
    }

    #[test]
    fn test_constant_residuals_are_degenerate() {
        let data = vec![0.0; 50];
        assert!(matches!(
            long_run_variance(&data, &LongRunVarianceConfig::default()),
            Err(HarnessError::NumericalError { .. })
        ));
    }
}
