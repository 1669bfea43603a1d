//! FFT-based autocovariance computation.
//!
//! Kernel long-run variance estimators with infinite-support kernels need every
//! sample autocovariance. Computing them directly costs O(n²) per replication;
//! the convolution theorem brings this down to O(n log n):
//! `acov(x) = IFFT(FFT(x) * conj(FFT(x))) / n` on a zero-padded buffer.

use crate::errors::{HarnessError, HarnessResult};
use rustfft::{num_complex::Complex, FftPlanner};
use std::cell::RefCell;

thread_local! {
    /// Planner cache; rustfft reuses plans for repeated sizes.
    static FFT_PLANNER: RefCell<FftPlanner<f64>> = RefCell::new(FftPlanner::new());
}

/// Biased sample autocovariances `γ(0..=max_lag)` of already-centred data.
///
/// Uses the `1/n` denominator at every lag, which keeps kernel-weighted sums
/// positive semi-definite.
pub fn fft_autocovariances(data: &[f64], max_lag: usize) -> HarnessResult<Vec<f64>> {
    let n = data.len();
    if n < 2 {
        return Err(HarnessError::InsufficientData {
            required: 2,
            actual: n,
        });
    }
    if max_lag >= n {
        return Err(HarnessError::InvalidParameter {
            parameter: "max_lag".to_string(),
            value: max_lag as f64,
            constraint: format!("must be less than data length ({})", n),
        });
    }

    let padded_size = (2 * n).next_power_of_two();
    let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(padded_size);
    buffer.extend(data.iter().map(|&x| Complex::new(x, 0.0)));
    buffer.resize(padded_size, Complex::new(0.0, 0.0));

    FFT_PLANNER.with(|planner| {
        let mut planner = planner.borrow_mut();
        planner.plan_fft_forward(padded_size).process(&mut buffer);
        for c in buffer.iter_mut() {
            *c = *c * c.conj();
        }
        planner.plan_fft_inverse(padded_size).process(&mut buffer);
    });

    // rustfft leaves the inverse transform unnormalised
    let scale = 1.0 / (padded_size as f64 * n as f64);
    let autocovariances: Vec<f64> = buffer[..=max_lag].iter().map(|c| c.re * scale).collect();

    if !autocovariances.iter().all(|v| v.is_finite()) {
        return Err(HarnessError::numerical(
            "fft_autocovariances",
            "non-finite autocovariance",
        ));
    }
    Ok(autocovariances)
}

/// Direct O(n·L) autocovariances with the same `1/n` convention.
pub fn direct_autocovariances(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len();
    (0..=max_lag.min(n.saturating_sub(1)))
        .map(|k| data[k..].iter().zip(data).map(|(a, b)| a * b).sum::<f64>() / n as f64)
        .collect()
}
