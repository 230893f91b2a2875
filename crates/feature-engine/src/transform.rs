//! Composite Feature Transforms
//!
//! Pure per-frame arithmetic over channels that have already been length
//! checked. Inputs are aligned by position.

use thiserror::Error;

/// A transform produced, or would produce, a non-finite value
#[derive(Debug, Clone, PartialEq, Error)]
#[error("frame {frame}: {reason}")]
pub struct NumericError {
    pub frame: usize,
    pub reason: String,
}

fn finite(frame: usize, value: f64) -> Result<f64, NumericError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumericError {
            frame,
            reason: format!("non-finite result {}", value),
        })
    }
}

/// `(num[i] + constant) / (den[i] + constant)` per frame
pub fn ratio_with_constant(
    num: &[f64],
    den: &[f64],
    constant: f64,
) -> Result<Vec<f64>, NumericError> {
    debug_assert_eq!(num.len(), den.len());
    num.iter()
        .zip(den)
        .enumerate()
        .map(|(frame, (&n, &d))| {
            let denominator = d + constant;
            if denominator == 0.0 {
                return Err(NumericError {
                    frame,
                    reason: format!("denominator {} + {} is zero", d, constant),
                });
            }
            finite(frame, (n + constant) / denominator)
        })
        .collect()
}

/// `second[i] - first[i]^2` per frame
pub fn variance_from_moments(first: &[f64], second: &[f64]) -> Result<Vec<f64>, NumericError> {
    debug_assert_eq!(first.len(), second.len());
    first
        .iter()
        .zip(second)
        .enumerate()
        .map(|(frame, (&m1, &m2))| finite(frame, m2 - m1 * m1))
        .collect()
}
