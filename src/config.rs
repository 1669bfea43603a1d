//! # Simulation Configuration
//!
//! Immutable records describing one Monte Carlo experiment: the local-to-unity
//! parameters, the deterministic specification and the replication settings.

use crate::errors::{
    validate_finite, validate_parameter, validate_positive_count, HarnessError, HarnessResult,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Replications used in the paper's experiments.
pub const PAPER_REPLICATIONS: usize = 10_000;
/// Steps used to approximate the Wiener-process functionals.
pub const PAPER_STEPS: usize = 5_000;
/// Seed used throughout the published tables.
pub const PAPER_SEED: u64 = 42;

/// Deterministic component removed before computing the statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Detrend {
    /// Level only (`"c"`)
    Constant,
    /// Level and linear trend (`"ct"`)
    ConstantTrend,
}

impl Detrend {
    /// Short code used in reports and on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Detrend::Constant => "c",
            Detrend::ConstantTrend => "ct",
        }
    }

    /// Number of deterministic regressors.
    pub fn num_regressors(&self) -> usize {
        match self {
            Detrend::Constant => 1,
            Detrend::ConstantTrend => 2,
        }
    }
}

impl FromStr for Detrend {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" => Ok(Detrend::Constant),
            "ct" => Ok(Detrend::ConstantTrend),
            other => Err(HarnessError::InvalidDetrend {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Detrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Configuration of one replication run.
///
/// `c == c_bar` is the boundary case at which the statistic has the standard
/// KPSS null distribution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Local-to-unity parameter of the simulated process
    pub c: f64,
    /// Boundary value used by the statistic's quasi-differencing
    pub c_bar: f64,
    /// Initial-condition scale of the simulated process
    pub alpha: f64,
    /// Deterministic specification
    pub detrend: Detrend,
    /// Number of Monte Carlo replications
    pub n_replications: usize,
    /// Sample size of each simulated path
    pub n_steps: usize,
    /// Seed of the replication stream
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::paper(10.0, 10.0, Detrend::Constant)
    }
}

impl SimulationConfig {
    /// Paper settings: 10,000 replications of 5,000 steps, seed 42, alpha 1.
    pub fn paper(c: f64, c_bar: f64, detrend: Detrend) -> Self {
        Self {
            c,
            c_bar,
            alpha: 1.0,
            detrend,
            n_replications: PAPER_REPLICATIONS,
            n_steps: PAPER_STEPS,
            seed: PAPER_SEED,
        }
    }

    /// Reduced settings for smoke runs and tests.
    pub fn quick(c: f64, c_bar: f64, detrend: Detrend) -> Self {
        Self {
            n_replications: 1_000,
            n_steps: 500,
            ..Self::paper(c, c_bar, detrend)
        }
    }

    /// Copy of this configuration with a different `c`.
    pub fn with_c(&self, c: f64) -> Self {
        Self {
            c,
            ..self.clone()
        }
    }

    /// Copy of this configuration with a different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Check the record's invariants.
    pub fn validate(&self) -> HarnessResult<()> {
        validate_positive_count(self.n_replications, "n_replications")?;
        validate_positive_count(self.n_steps, "n_steps")?;
        validate_finite(self.c, "c")?;
        validate_finite(self.c_bar, "c_bar")?;
        validate_finite(self.alpha, "alpha")?;
        validate_parameter(self.c, 0.0, f64::MAX, "c")?;
        validate_parameter(self.c_bar, 0.0, f64::MAX, "c_bar")?;
        validate_parameter(self.alpha, 0.0, f64::MAX, "alpha")?;
        Ok(())
    }

    /// True at the boundary `c == c_bar`.
    pub fn is_boundary(&self) -> bool {
        self.c == self.c_bar
    }
}
