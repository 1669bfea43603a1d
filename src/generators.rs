//! Near-integrated data-generating processes.
//!
//! The harness consumes sample paths through the [`PathGenerator`] trait; the
//! crate ships [`NearIntegratedMa`], the process used throughout the paper:
//!
//! ```text
//! y_t = μ + w_t,   w_t = ρ w_{t-1} + v_t,   ρ = 1 - c/T,
//! v_t = ε_t - θ ε_{t-1},   ε_t ~ iid N(0, σ²)
//! ```
//!
//! The initial condition is `w_0 = α σ ξ / sqrt(1 - ρ²)` with `ξ ~ N(0, 1)`,
//! so `α = 1` draws `w_0` from the stationary distribution of the AR part and
//! larger `α` inflates it. At `c = 0` the process starts from `w_0 = 0`.
//!
//! Draw order is fixed: `ξ`, then `ε_0`, then `ε_1..ε_T`. `ξ` is drawn even
//! when it is not used, so the innovation stream seen by a path depends only
//! on the RNG state, never on `c` or `α`.

use crate::errors::{validate_finite, validate_parameter, HarnessError, HarnessResult};
use crate::rng::SimulationRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-path parameters chosen by the experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathSpec {
    /// Sample size `T`
    pub n: usize,
    /// Local-to-unity parameter
    pub c: f64,
    /// MA(1) coefficient of the innovations
    pub theta: f64,
    /// Initial-condition scale
    pub alpha: f64,
}

/// Source of simulated sample paths.
///
/// Implementations must draw all randomness from `rng` so that a path is a
/// pure function of `(spec, rng state)`.
pub trait PathGenerator: Send + Sync {
    /// Produce one sample path of length `spec.n`.
    fn generate(&self, spec: &PathSpec, rng: &mut SimulationRng) -> HarnessResult<Vec<f64>>;
}

/// Near-integrated process with MA(1) innovations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NearIntegratedMa {
    /// Level `μ`
    pub mu: f64,
    /// Innovation standard deviation `σ`
    pub sigma: f64,
}

impl Default for NearIntegratedMa {
    fn default() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
        }
    }
}

impl NearIntegratedMa {
    /// Process with level `mu` and innovation scale `sigma`.
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }
}

impl PathGenerator for NearIntegratedMa {
    fn generate(&self, spec: &PathSpec, rng: &mut SimulationRng) -> HarnessResult<Vec<f64>> {
        simulate_near_integrated_ma(
            rng, spec.n, spec.c, spec.theta, spec.alpha, self.mu, self.sigma,
        )
    }
}

fn validate_path_parameters(
    n: usize,
    c: f64,
    theta: f64,
    alpha: f64,
    mu: f64,
    sigma: f64,
) -> HarnessResult<()> {
    if n < 2 {
        return Err(HarnessError::InsufficientData {
            required: 2,
            actual: n,
        });
    }
    validate_finite(c, "c")?;
    validate_finite(theta, "theta")?;
    validate_finite(alpha, "alpha")?;
    validate_finite(mu, "mu")?;
    validate_finite(sigma, "sigma")?;
    if c < 0.0 || c >= n as f64 {
        return Err(HarnessError::InvalidParameter {
            parameter: "c".to_string(),
            value: c,
            constraint: format!("[0, {}) so that 0 < rho <= 1", n),
        });
    }
    validate_parameter(alpha, 0.0, f64::MAX, "alpha")?;
    if sigma <= 0.0 {
        return Err(HarnessError::InvalidParameter {
            parameter: "sigma".to_string(),
            value: sigma,
            constraint: "must be positive".to_string(),
        });
    }
    Ok(())
}

/// Simulate one path of the near-integrated MA(1) process.
///
/// # Arguments
/// * `rng` - Stream the path draws from; it is advanced by `n + 2` variates
/// * `n` - Sample size `T`
/// * `c` - Local-to-unity parameter, `ρ = 1 - c/T`
/// * `theta` - MA(1) coefficient
/// * `alpha` - Initial-condition scale
/// * `mu` - Level
/// * `sigma` - Innovation standard deviation
///
/// # Returns
/// The path `y_1..y_T`.
pub fn simulate_near_integrated_ma(
    rng: &mut SimulationRng,
    n: usize,
    c: f64,
    theta: f64,
    alpha: f64,
    mu: f64,
    sigma: f64,
) -> HarnessResult<Vec<f64>> {
    validate_path_parameters(n, c, theta, alpha, mu, sigma)?;

    let rho = 1.0 - c / n as f64;
    let xi = rng.standard_normal();
    let mut eps_prev = rng.normal(sigma);

    let mut w = if c > 0.0 {
        alpha * sigma * xi / (1.0 - rho * rho).sqrt()
    } else {
        0.0
    };

    let mut path = Vec::with_capacity(n);
    for _ in 0..n {
        let eps = rng.normal(sigma);
        let v = eps - theta * eps_prev;
        w = rho * w + v;
        path.push(mu + w);
        eps_prev = eps;
    }
    Ok(path)
}
