//! Per-row feature math
//!
//! Pure functions behind every derived column. None of them fail: missing
//! inputs are filled and numeric pathologies are sanitized instead.
//!
//! # Feature Summary
//!
//! | Column | Function |
//! |---|---|
//! | `coeff_var_Number` | [`coefficient_of_variation`] |
//! | `log_TotSize` | [`log_size`] |
//! | `flow_entropy` | [`flow_entropy`] |
//! | `rate_sin` / `rate_cos`, `logTot_sin` / `logTot_cos` | [`angle_encoding`] |
//!
//! `rate_normalized` and `pca_1` / `pca_2` depend on fitted state and live in
//! [`normalization`](crate::normalization).

use std::f64::consts::PI;

/// Guards the coefficient-of-variation denominator against near-zero means
pub const CV_EPSILON: f64 = 1e-9;

/// Magnitude bound applied to candidate values before any fitted transform
pub const CLIP_MAGNITUDE: f64 = 1e12;

/// Replacement for `±∞` in candidate vectors, before clipping
pub const INFINITY_REPLACEMENT: f64 = f64::MAX / 1e6;

/// `Std / (AVG + ε)` when `AVG ≠ 0`, else `0`
///
/// ```
/// # use flowaug_analysis::feature::coefficient_of_variation;
/// assert!((coefficient_of_variation(4.0, 2.0) - 2.0).abs() < 1e-6);
/// assert_eq!(coefficient_of_variation(4.0, 0.0), 0.0);
/// ```
#[must_use]
pub fn coefficient_of_variation(std: f64, avg: f64) -> f64 {
    if avg == 0.0 {
        0.0
    } else {
        std / (avg + CV_EPSILON)
    }
}

/// `ln(1 + size)`
#[must_use]
pub fn log_size(size: f64) -> f64 {
    size.ln_1p()
}

/// Shannon entropy (base 2) of one row's protocol weights
///
/// Weights are normalized by their sum. A row summing to zero, or holding any
/// non-finite weight, has entropy `0`. Only `p > 0` terms contribute.
///
/// ```
/// # use flowaug_analysis::feature::flow_entropy;
/// assert_eq!(flow_entropy(&[0.0, 1.0, 0.0]), 0.0);
/// assert!((flow_entropy(&[1.0, 1.0, 1.0, 1.0]) - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn flow_entropy(weights: &[f64]) -> f64 {
    if weights.iter().any(|w| !w.is_finite()) {
        return 0.0;
    }
    let sum = weights.iter().sum::<f64>();
    let sum = if sum == 0.0 { 1.0 } else { sum };
    weights
        .iter()
        .map(|&w| w / sum)
        .filter(|&p| p > 0.0)
        .fold(0.0, |acc, p| acc - p * p.log2())
}

/// Replace `NaN` with `0`, saturate infinities, and clip to `±CLIP_MAGNITUDE`
///
/// ```
/// # use flowaug_analysis::feature::sanitize_candidate;
/// assert_eq!(sanitize_candidate(f64::NAN), 0.0);
/// assert_eq!(sanitize_candidate(f64::INFINITY), 1e12);
/// assert_eq!(sanitize_candidate(-5e15), -1e12);
/// assert_eq!(sanitize_candidate(3.5), 3.5);
/// ```
#[must_use]
pub fn sanitize_candidate(value: f64) -> f64 {
    let value = if value.is_nan() {
        0.0
    } else if value == f64::INFINITY {
        INFINITY_REPLACEMENT
    } else if value == f64::NEG_INFINITY {
        -INFINITY_REPLACEMENT
    } else {
        value
    };
    value.clamp(-CLIP_MAGNITUDE, CLIP_MAGNITUDE)
}

/// Largest non-`NaN` value, keeping infinities; `NaN` if there is none
#[must_use]
pub fn nan_max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
        .unwrap_or(f64::NAN)
}

/// Encode values as `(sin θ, cos θ)` with `θ = π · x / max`
///
/// Each value is sanitized first (non-finite → `0`). A `max` that is not
/// finite and positive falls back to `1.0`. Values in `[0, max]` land in `[0, π]`.
///
/// ```
/// # use flowaug_analysis::feature::angle_encoding;
/// let encoded = angle_encoding(&[0.0, 5.0, 10.0, f64::NAN], 10.0);
/// assert_eq!(encoded[0], (0.0, 1.0));
/// assert!((encoded[1].0 - 1.0).abs() < 1e-12 && encoded[1].1.abs() < 1e-12);
/// assert!(encoded[2].0.abs() < 1e-12 && (encoded[2].1 + 1.0).abs() < 1e-12);
/// assert_eq!(encoded[3], (0.0, 1.0));
/// ```
#[must_use]
pub fn angle_encoding(values: &[f64], max: f64) -> Vec<(f64, f64)> {
    let max = if max.is_finite() && max > 0.0 { max } else { 1.0 };
    values
        .iter()
        .map(|&x| {
            let x = if x.is_finite() { x } else { 0.0 };
            (PI * (x / max)).sin_cos()
        })
        .collect()
}
