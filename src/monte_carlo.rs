//! Replication loop and critical-value extraction.
//!
//! A run repeats `generate → evaluate` on a single seeded stream and keeps the
//! raw statistic of every replication. Critical values are read off the sample
//! as upper-tail percentiles.
//!
//! ## Failure handling
//!
//! Configuration errors always abort the run. A numerical failure in one
//! replication (for example a degenerate long-run variance) aborts the run
//! under [`FailurePolicy::Propagate`], the default. Under
//! [`FailurePolicy::Sentinel`] the replication is stored as `NaN`, counted in
//! [`ReplicationSample::failed`] and logged; percentiles then skip it while
//! rejection rates count it as a non-rejection.

use crate::config::{Detrend, SimulationConfig};
use crate::errors::{HarnessError, HarnessResult};
use crate::generators::{NearIntegratedMa, PathGenerator, PathSpec};
use crate::math_utils::{fraction_exceeding, quantile_sorted, sorted_finite};
use crate::rng::SimulationRng;
use crate::statistic::{ModifiedKpss, StatisticEvaluator};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do when a replication fails numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailurePolicy {
    /// Abort the run with the error
    #[default]
    Propagate,
    /// Record `NaN` and continue
    Sentinel,
}

/// Statistic values of one run, in replication order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplicationSample {
    /// One value per replication; `NaN` marks a failed replication
    pub values: Vec<f64>,
    /// Number of `NaN` sentinels in `values`
    pub failed: usize,
}

impl ReplicationSample {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fraction of replications with statistic strictly above `threshold`.
    pub fn rejection_rate(&self, threshold: f64) -> f64 {
        fraction_exceeding(&self.values, threshold)
    }
}

/// Run `n_replications` draws of `replication`, applying `policy` to
/// numerical failures.
///
/// `replication` receives the replication index. Draws happen strictly in
/// index order.
pub fn replicate<F>(
    n_replications: usize,
    policy: FailurePolicy,
    mut replication: F,
) -> HarnessResult<ReplicationSample>
where
    F: FnMut(usize) -> HarnessResult<f64>,
{
    let mut values = Vec::with_capacity(n_replications);
    let mut failed = 0;

    for i in 0..n_replications {
        match replication(i) {
            Ok(value) => values.push(value),
            Err(err) if policy == FailurePolicy::Sentinel && err.is_numerical_error() => {
                log::warn!("replication {} failed, recording NaN: {}", i, err);
                values.push(f64::NAN);
                failed += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(ReplicationSample { values, failed })
}

/// Replication loop with the default failure policy.
pub fn run_replications<G, E>(
    config: &SimulationConfig,
    generator: &G,
    evaluator: &E,
) -> HarnessResult<ReplicationSample>
where
    G: PathGenerator + ?Sized,
    E: StatisticEvaluator + ?Sized,
{
    run_replications_with_policy(config, generator, evaluator, FailurePolicy::default())
}

/// Replication loop.
///
/// One [`SimulationRng`] seeded from `config.seed` feeds every replication in
/// turn; equal configurations therefore produce bit-identical samples. Paths
/// use `T = n_steps` and iid innovations (`theta = 0`).
pub fn run_replications_with_policy<G, E>(
    config: &SimulationConfig,
    generator: &G,
    evaluator: &E,
    policy: FailurePolicy,
) -> HarnessResult<ReplicationSample>
where
    G: PathGenerator + ?Sized,
    E: StatisticEvaluator + ?Sized,
{
    config.validate()?;

    let spec = PathSpec {
        n: config.n_steps,
        c: config.c,
        theta: 0.0,
        alpha: config.alpha,
    };
    let mut rng = SimulationRng::with_seed(config.seed);

    let sample = replicate(config.n_replications, policy, |_| {
        let path = generator.generate(&spec, &mut rng)?;
        let result = evaluator.evaluate(&path, config.c_bar, config.detrend)?;
        Ok(result.statistic)
    })?;

    log::debug!(
        "{} replications at c = {}, c_bar = {}, alpha = {}, detrend = {}: {} failed",
        sample.len(),
        config.c,
        config.c_bar,
        config.alpha,
        config.detrend,
        sample.failed
    );
    Ok(sample)
}

/// Statistic sample for one configuration of the paper's process.
///
/// Uses [`NearIntegratedMa`] with `mu = 0`, `sigma = 1` and the default
/// [`ModifiedKpss`] evaluator; `n_steps` is both the path length and the
/// discretisation of the limiting Wiener functionals.
pub fn simulate_critical_values(
    c: f64,
    c_bar: f64,
    alpha: f64,
    detrend: Detrend,
    n_replications: usize,
    n_steps: usize,
    seed: u64,
) -> HarnessResult<ReplicationSample> {
    let config = SimulationConfig {
        c,
        c_bar,
        alpha,
        detrend,
        n_replications,
        n_steps,
        seed,
    };
    run_replications(&config, &NearIntegratedMa::default(), &ModifiedKpss::default())
}

/// Upper-tail critical values of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CriticalValues {
    /// 99th percentile
    pub cv_1pct: f64,
    /// 95th percentile
    pub cv_5pct: f64,
    /// 90th percentile
    pub cv_10pct: f64,
    /// `NaN` sentinels left out of the order statistics
    pub excluded: usize,
}

/// Critical values for one grid value, as printed in the reports.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CriticalValueRow {
    pub grid_parameter: f64,
    pub cv_1pct: f64,
    pub cv_5pct: f64,
    pub cv_10pct: f64,
}

/// 99th, 95th and 90th percentiles of the finite values in `sample`.
///
/// # Errors
/// `InsufficientData` when the sample holds no finite value.
pub fn extract_critical_values(sample: &ReplicationSample) -> HarnessResult<CriticalValues> {
    let (sorted, excluded) = sorted_finite(&sample.values);
    if sorted.is_empty() {
        return Err(HarnessError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if excluded > 0 {
        log::warn!(
            "{} of {} replications excluded from critical values",
            excluded,
            sample.len()
        );
    }

    Ok(CriticalValues {
        cv_1pct: quantile_sorted(&sorted, 0.99),
        cv_5pct: quantile_sorted(&sorted, 0.95),
        cv_10pct: quantile_sorted(&sorted, 0.90),
        excluded,
    })
}

/// [`CriticalValueRow`] for `grid_parameter`.
pub fn critical_value_row(
    grid_parameter: f64,
    sample: &ReplicationSample,
) -> HarnessResult<CriticalValueRow> {
    let cv = extract_critical_values(sample)?;
    Ok(CriticalValueRow {
        grid_parameter,
        cv_1pct: cv.cv_1pct,
        cv_5pct: cv.cv_5pct,
        cv_10pct: cv.cv_10pct,
    })
}
