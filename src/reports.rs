//! The three published experiments, as printable reports.
//!
//! Each report runs its simulations eagerly and returns a plain data record;
//! rendering is its `Display` implementation. Paper settings are the defaults
//! and can be reduced through [`ReportSettings`].

use crate::calibration::{simulate_power_and_size, PowerCurve};
use crate::config::{Detrend, PAPER_REPLICATIONS, PAPER_SEED, PAPER_STEPS};
use crate::errors::{validate_positive_count, HarnessResult};
use crate::monte_carlo::{critical_value_row, simulate_critical_values, CriticalValueRow};
use crate::size_table::{simulate_size_table, SizeTable, SizeTableConfig};
use crate::statistic::kpss_critical_value;
use std::fmt;

/// Boundary values `c̄` tabulated by the critical-values report.
pub const CRITICAL_VALUE_C_BARS: [f64; 6] = [5.0, 7.0, 10.0, 13.0, 15.0, 20.0];

/// Boundary value used for the power curves.
pub const POWER_C_BAR: f64 = 10.0;
/// Rejection rate the power curves are calibrated to at `c = 0`.
pub const POWER_NOMINAL: f64 = 0.5;
/// Initial-condition scales, one curve each.
pub const POWER_ALPHAS: [f64; 3] = [1.0, 2.0, 3.0];
const POWER_REPLICATIONS: usize = 5_000;
const POWER_STEPS: usize = 2_000;

/// Published Table 1 sizes of `S^μ(10)` by theta; identical across alpha.
pub const TABLE1_PAPER_SIZES: [(f64, f64); 3] = [(0.0, 0.046), (0.6, 0.021), (-0.6, 0.051)];

const RULE_WIDTH: usize = 70;

/// Overrides of the paper's run sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSettings {
    pub seed: Option<u64>,
    /// Replications per simulation (critical values and power curves)
    pub replications: Option<usize>,
    /// Path length (critical values and power curves)
    pub steps: Option<usize>,
    /// Simulations per cell (Table 1)
    pub sims: Option<usize>,
}

impl ReportSettings {
    fn seed(&self) -> u64 {
        self.seed.unwrap_or(PAPER_SEED)
    }

    fn counts(&self, replications: usize, steps: usize) -> HarnessResult<(usize, usize)> {
        let replications = self.replications.unwrap_or(replications);
        let steps = self.steps.unwrap_or(steps);
        validate_positive_count(replications, "replications")?;
        validate_positive_count(steps, "steps")?;
        Ok((replications, steps))
    }
}

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(f)
}

/// Critical values for one deterministic specification.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalValueSection {
    pub detrend: Detrend,
    pub rows: Vec<CriticalValueRow>,
}

/// Simulated critical values at the boundary `c = c̄`.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalValuesReport {
    pub replications: usize,
    pub steps: usize,
    pub seed: u64,
    /// Level case first, then trend case
    pub sections: Vec<CriticalValueSection>,
}

const DETRENDS: [Detrend; 2] = [Detrend::Constant, Detrend::ConstantTrend];

/// Run the critical-value experiment for both deterministic cases and every
/// `c̄` in [`CRITICAL_VALUE_C_BARS`].
pub fn critical_values_report(settings: &ReportSettings) -> HarnessResult<CriticalValuesReport> {
    let (replications, steps) = settings.counts(PAPER_REPLICATIONS, PAPER_STEPS)?;
    let seed = settings.seed();
    log::info!(
        "critical values: {} replications of {} steps, seed {}",
        replications,
        steps,
        seed
    );

    let tasks: Vec<(Detrend, f64)> = DETRENDS
        .iter()
        .flat_map(|&detrend| CRITICAL_VALUE_C_BARS.iter().map(move |&c_bar| (detrend, c_bar)))
        .collect();

    let row_at = |&(detrend, c_bar): &(Detrend, f64)| -> HarnessResult<CriticalValueRow> {
        let sample =
            simulate_critical_values(c_bar, c_bar, 1.0, detrend, replications, steps, seed)?;
        critical_value_row(c_bar, &sample)
    };

    #[cfg(feature = "parallel")]
    let rows = {
        use rayon::prelude::*;
        tasks
            .par_iter()
            .map(row_at)
            .collect::<HarnessResult<Vec<_>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let rows = tasks
        .iter()
        .map(row_at)
        .collect::<HarnessResult<Vec<_>>>()?;

    let sections = rows
        .chunks(CRITICAL_VALUE_C_BARS.len())
        .zip(DETRENDS)
        .map(|(rows, detrend)| CriticalValueSection {
            detrend,
            rows: rows.to_vec(),
        })
        .collect();

    Ok(CriticalValuesReport {
        replications,
        steps,
        seed,
        sections,
    })
}

impl fmt::Display for CriticalValuesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(
            f,
            "Simulated critical values of the modified KPSS test\nHarris, Leybourne and McCabe (2007)",
        )?;
        writeln!(f, "Settings:")?;
        writeln!(f, "  Replications: {}", self.replications)?;
        writeln!(f, "  Steps: {}", self.steps)?;
        writeln!(f, "  Seed: {}", self.seed)?;
        writeln!(f)?;

        for section in &self.sections {
            let title = match section.detrend {
                Detrend::Constant => "LEVEL CASE (intercept only, detrend = c)",
                Detrend::ConstantTrend => "TREND CASE (intercept and trend, detrend = ct)",
            };
            writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
            writeln!(f, "{}", title)?;
            writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
            writeln!(f)?;
            writeln!(f, "{:>6} | {:>10} | {:>10} | {:>10}", "c_bar", "1%", "5%", "10%")?;
            writeln!(f, "{}", "-".repeat(46))?;
            for row in &section.rows {
                writeln!(
                    f,
                    "{:>6.0} | {:>10.4} | {:>10.4} | {:>10.4}",
                    row.grid_parameter, row.cv_1pct, row.cv_5pct, row.cv_10pct
                )?;
            }
            writeln!(f)?;
            writeln!(f, "Standard KPSS critical values (c = c_bar):")?;
            for (label, level) in [("1%:", 0.01), ("5%:", 0.05), ("10%:", 0.10)] {
                if let Some(cv) = kpss_critical_value(section.detrend, level) {
                    writeln!(f, "  {:<4} {:.3}", label, cv)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Power curve for one initial-condition scale.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaCurve {
    pub alpha: f64,
    pub curve: PowerCurve,
}

/// Rejection rates over `c = 0..=10`, calibrated at `c = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCurvesReport {
    pub c_bar: f64,
    pub nominal: f64,
    pub replications: usize,
    pub steps: usize,
    pub seed: u64,
    pub curves: Vec<AlphaCurve>,
}

/// Run the power experiment, one curve per alpha in [`POWER_ALPHAS`].
pub fn power_curves_report(settings: &ReportSettings) -> HarnessResult<PowerCurvesReport> {
    let (replications, steps) = settings.counts(POWER_REPLICATIONS, POWER_STEPS)?;
    let seed = settings.seed();
    log::info!(
        "power curves: {} replications of {} steps, seed {}",
        replications,
        steps,
        seed
    );

    let c_values: Vec<f64> = (0..=10).map(f64::from).collect();
    let curves = POWER_ALPHAS
        .iter()
        .map(|&alpha| {
            let curve = simulate_power_and_size(
                &c_values,
                POWER_C_BAR,
                alpha,
                POWER_NOMINAL,
                Detrend::Constant,
                replications,
                steps,
                seed,
            )?;
            Ok(AlphaCurve { alpha, curve })
        })
        .collect::<HarnessResult<Vec<_>>>()?;

    Ok(PowerCurvesReport {
        c_bar: POWER_C_BAR,
        nominal: POWER_NOMINAL,
        replications,
        steps,
        seed,
        curves,
    })
}

impl fmt::Display for PowerCurvesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Power curves of the modified KPSS test (Figure 1)")?;
        writeln!(
            f,
            "c_bar = {}, calibrated to rejection rate {:.2} at c = 0",
            self.c_bar, self.nominal
        )?;
        writeln!(
            f,
            "Replications: {}, steps: {}, seed: {}",
            self.replications, self.steps, self.seed
        )?;

        for AlphaCurve { alpha, curve } in &self.curves {
            writeln!(f)?;
            writeln!(f, "alpha = {} (cv = {:.4}):", alpha, curve.cv)?;
            writeln!(f, "{}", "-".repeat(40))?;
            writeln!(f, "{:>4} | {:>15}", "c", "Rejection Rate")?;
            writeln!(f, "{}", "-".repeat(25))?;
            for point in &curve.points {
                writeln!(f, "{:>4.0} | {:>15.4}", point.c, point.rejection_rate)?;
            }
        }
        Ok(())
    }
}

/// Empirical sizes at the 5% level (Table 1).
#[derive(Debug, Clone, PartialEq)]
pub struct Table1Report {
    pub config: SizeTableConfig,
    pub table: SizeTable,
}

/// Run the Table 1 experiment.
pub fn table1_report(settings: &ReportSettings) -> HarnessResult<Table1Report> {
    let paper = SizeTableConfig::paper();
    let config = SizeTableConfig {
        n_sims: settings.sims.unwrap_or(paper.n_sims),
        seed: settings.seed(),
        ..paper
    };
    log::info!(
        "table 1: {} simulations per cell, T = {}, seed {}",
        config.n_sims,
        config.n,
        config.seed
    );
    let table = simulate_size_table(&config)?;
    Ok(Table1Report { config, table })
}

impl fmt::Display for Table1Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = &self.config;
        heading(f, "Table 1: empirical sizes at the 5% level")?;
        writeln!(f, "DGP: y_t = mu + w_t, w_t = rho * w_(t-1) + v_t")?;
        writeln!(f, "     v_t = e_t - theta * e_(t-1), e_t ~ iid N(0, 1)")?;
        writeln!(
            f,
            "     T = {}, c = {}, c_bar = {}, {} simulations, seed {}",
            config.n, config.c, config.c_bar, config.n_sims, config.seed
        )?;
        writeln!(f, "Long-run variance: {}", config.lrv)?;
        writeln!(f)?;

        write!(f, "{:>6}", "theta")?;
        for alpha in &self.table.alphas {
            write!(f, " | {:>8}", format!("alpha={}", alpha))?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(6 + 11 * self.table.alphas.len()))?;
        for (i, theta) in self.table.thetas.iter().enumerate() {
            write!(f, "{:>6.1}", theta)?;
            for cell in self.table.row(i) {
                write!(f, " | {:>8.3}", cell.empirical_size)?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(f, "Table 1 from the paper (S^mu(10), identical for alpha = 1, 3, 5):")?;
        for (theta, size) in TABLE1_PAPER_SIZES {
            writeln!(f, "{:>6.1} | {:>8.3}", theta, size)?;
        }
        writeln!(f)?;
        writeln!(f, "Note: sizes at theta != 0 depend on the long-run variance estimator.")?;
        writeln!(f, "The kernel estimate overstates omega^2 under negative MA correlation,")?;
        writeln!(f, "so the theta = 0.6 row can fall well below the published size.")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduced() -> ReportSettings {
        ReportSettings {
            seed: Some(42),
            replications: Some(60),
            steps: Some(100),
            sims: Some(40),
        }
    }

    #[test]
    fn test_critical_values_report_layout() {
        let report = critical_values_report(&reduced()).unwrap();
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[0].detrend, Detrend::Constant);
        assert_eq!(report.sections[1].detrend, Detrend::ConstantTrend);
        let c_bars: Vec<f64> = report.sections[1]
            .rows
            .iter()
            .map(|r| r.grid_parameter)
            .collect();
        assert_eq!(c_bars, CRITICAL_VALUE_C_BARS);

        let text = report.to_string();
        assert!(text.contains("LEVEL CASE"));
        assert!(text.contains("TREND CASE"));
        assert!(text.contains("0.463"));
        assert!(text.contains("0.146"));
        assert!(text.contains("Replications: 60"));
    }

    #[test]
    fn test_power_curves_report_layout() {
        let report = power_curves_report(&reduced()).unwrap();
        assert_eq!(report.curves.len(), 3);
        for AlphaCurve { curve, .. } in &report.curves {
            assert_eq!(curve.points.len(), 11);
            assert_eq!(curve.rate_at(0.0), Some(0.5));
        }
        assert!(report.to_string().contains("Rejection Rate"));
    }

    #[test]
    fn test_table1_report_layout() {
        let report = table1_report(&reduced()).unwrap();
        assert_eq!(report.config.n_sims, 40);
        assert_eq!(report.table.cells.len(), 9);
        let text = report.to_string();
        assert!(text.contains("alpha=3"));
        assert!(text.contains("0.021"));
        assert!(text.contains("Long-run variance: quadratic spectral kernel, Andrews bandwidth"));
        assert!(text.contains("theta = 0.6 row can fall well below the published size"));
    }

    #[test]
    fn test_critical_value_rows_follow_detrend_then_c_bar() {
        let report = critical_values_report(&reduced()).unwrap();
        for section in &report.sections {
            let c_bars: Vec<f64> = section.rows.iter().map(|r| r.grid_parameter).collect();
            assert_eq!(c_bars, CRITICAL_VALUE_C_BARS);
        }
        // Removing a trend shrinks the statistic, so the trend rows sit lower
        let level = &report.sections[0].rows;
        let trend = &report.sections[1].rows;
        for (l, t) in level.iter().zip(trend) {
            assert!(t.cv_5pct < l.cv_5pct, "c_bar = {}", l.grid_parameter);
        }
    }

    #[test]
    fn test_zero_counts_rejected() {
        let settings = ReportSettings {
            replications: Some(0),
            ..ReportSettings::default()
        };
        assert!(critical_values_report(&settings).is_err());
    }
}
