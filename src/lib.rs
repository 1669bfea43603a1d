//! # Near-Integration KPSS Simulation Harness
//!
//! Monte Carlo reproduction of Harris, Leybourne and McCabe (2007), "Modified
//! KPSS tests for near integration".
//!
//! The crate simulates near-integrated processes, evaluates the modified KPSS
//! statistic on every path and turns the resulting samples into critical
//! values, calibrated power curves and empirical size tables.
//!
//! ## Key Features
//!
//! - **Replication Loop**: seeded, bit-reproducible `generate → evaluate` runs
//! - **Critical Values**: type-7 percentiles of the simulated null distribution
//! - **Power Calibration**: one critical value calibrated at a reference `c`, swept over a grid
//! - **Size Tables**: 5%-level rejection frequencies over MA coefficients and initial conditions
//! - **Pluggable Collaborators**: any [`PathGenerator`] and [`StatisticEvaluator`] can be injected
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nearkpss_sim::{extract_critical_values, simulate_critical_values, Detrend};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Boundary case c = c̄ = 10: the standard KPSS null distribution
//!     let sample = simulate_critical_values(10.0, 10.0, 1.0, Detrend::Constant, 1_000, 500, 42)?;
//!     let cv = extract_critical_values(&sample)?;
//!     println!("1%: {:.3}  5%: {:.3}  10%: {:.3}", cv.cv_1pct, cv.cv_5pct, cv.cv_10pct);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Leaves first: [`rng`] and [`generators`] produce paths, [`statistic`] (on top
//! of [`long_run_variance`] and [`fft_ops`]) evaluates them, [`monte_carlo`]
//! runs the replication loop, and [`calibration`], [`size_table`] and
//! [`reports`] build the published experiments from it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod fft_ops;
pub mod long_run_variance;
pub mod math_utils;
pub mod rng;

// Simulation
pub mod calibration;
pub mod generators;
pub mod grid;
pub mod monte_carlo;
pub mod reports;
pub mod size_table;
pub mod statistic;

pub use config::{Detrend, SimulationConfig, PAPER_REPLICATIONS, PAPER_SEED, PAPER_STEPS};
pub use errors::{HarnessError, HarnessResult};
pub use rng::SimulationRng;

pub use generators::{simulate_near_integrated_ma, NearIntegratedMa, PathGenerator, PathSpec};
pub use long_run_variance::{BandwidthRule, Kernel, LongRunVarianceConfig};
pub use statistic::{
    modified_kpss_test, modified_kpss_test_with_config, ModifiedKpss, ModifiedKpssConfig,
    StatisticEvaluator, TestResult,
};

pub use calibration::{calibrate_power_curve, simulate_power_and_size, PowerCurve, PowerPoint};
pub use grid::{GridPoint, ParameterGrid};
pub use monte_carlo::{
    critical_value_row, extract_critical_values, run_replications, run_replications_with_policy,
    simulate_critical_values, CriticalValueRow, CriticalValues, FailurePolicy, ReplicationSample,
};
pub use size_table::{
    build_size_table, simulate_size_table, SizeTable, SizeTableCell, SizeTableConfig,
};

pub use math_utils::percentile;
pub use reports::{critical_values_report, power_curves_report, table1_report, ReportSettings};
