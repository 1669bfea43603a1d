//! Seeded random streams for reproducible Monte Carlo runs.
//!
//! Every generator call receives an explicit [`SimulationRng`] handle; there is
//! no process-wide random state. Units of work that may run in parallel (sweep
//! points, size-table rows) derive their own stream from `(seed, index)` with
//! [`SimulationRng::derive`], so their output never depends on scheduling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::StandardNormal;

/// Golden-ratio multiplier used to decorrelate derived seeds.
const GOLDEN_RATIO_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Mix a base seed with a stream index.
///
/// Distinct indices map to distinct, well-separated seeds; the mapping is a
/// pure function so derived streams are reproducible.
pub fn mix_seed(base_seed: u64, index: usize) -> u64 {
    (base_seed ^ (index as u64).rotate_left(32))
        .wrapping_mul(GOLDEN_RATIO_SEED_MIX)
        .rotate_left(17)
}

/// ChaCha20 stream owned by exactly one unit of work.
#[derive(Clone, Debug)]
pub struct SimulationRng {
    rng: ChaCha20Rng,
    seed: u64,
    draws: u64,
}

impl SimulationRng {
    /// Stream seeded directly from `seed`.
    ///
    /// `seed_from_u64` expands the value to the full 256-bit ChaCha key.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Independent stream for unit `index` of a run seeded with `seed`.
    pub fn derive(seed: u64, index: usize) -> Self {
        Self::with_seed(mix_seed(seed, index))
    }

    /// Seed this stream was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of variates drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Standard normal variate.
    pub fn standard_normal(&mut self) -> f64 {
        self.draws += 1;
        self.rng.sample(StandardNormal)
    }

    /// Normal variate with mean zero and standard deviation `sigma`.
    pub fn normal(&mut self, sigma: f64) -> f64 {
        sigma * self.standard_normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SimulationRng::with_seed(12345);
        let mut b = SimulationRng::with_seed(12345);
        for _ in 0..100 {
            assert_eq!(a.standard_normal().to_bits(), b.standard_normal().to_bits());
        }
        assert_eq!(a.draws(), 100);
    }

    #[test]
    fn test_derived_streams_differ() {
        let mut a = SimulationRng::derive(42, 0);
        let mut b = SimulationRng::derive(42, 1);
        let xs: Vec<f64> = (0..10).map(|_| a.standard_normal()).collect();
        let ys: Vec<f64> = (0..10).map(|_| b.standard_normal()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_derive_is_pure() {
        assert_eq!(mix_seed(42, 7), mix_seed(42, 7));
        assert_ne!(mix_seed(42, 7), mix_seed(42, 8));
        assert_ne!(mix_seed(42, 0), mix_seed(43, 0));
        let mut a = SimulationRng::derive(9, 3);
        let mut b = SimulationRng::derive(9, 3);
        assert_eq!(a.seed(), b.seed());
        assert_eq!(a.standard_normal(), b.standard_normal());
    }

    #[test]
    fn test_normal_scale() {
        let mut rng = SimulationRng::with_seed(1);
        let buffer: Vec<f64> = (0..20_000).map(|_| rng.normal(2.0)).collect();
        let mean = buffer.iter().sum::<f64>() / buffer.len() as f64;
        let var = buffer.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / buffer.len() as f64;
        assert!(mean.abs() < 0.05, "mean = {}", mean);
        assert!((var - 4.0).abs() < 0.2, "var = {}", var);
    }
}
