//! Numeric Utilities
//!
//! Standard normal CDF/quantile, density grids and histogram densities shared
//! by both engines.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use thiserror::Error;

/// Number of standard deviations either side of the mean covered by a normal curve
pub const CURVE_HALF_WIDTH_SDS: f64 = 4.0;

/// A quantity came out as NaN or outside its valid range
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("indeterminate result: {quantity} evaluated to {value}")]
pub struct IndeterminateError {
    /// Name of the offending quantity (e.g. "p-value")
    pub quantity: &'static str,
    /// The value that was produced
    pub value: f64,
}

/// Standard normal CDF, Φ(x)
pub fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal quantile (inverse CDF), Φ⁻¹(p)
///
/// Returns `-inf` for `p <= 0`, `+inf` for `p >= 1` and NaN for NaN.
pub fn normal_quantile(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    Normal::standard().inverse_cdf(p)
}

/// Normal density at `x` for the given mean and standard deviation
///
/// NaN when `sd` is not a positive finite number.
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    Normal::new(mean, sd).map_or(f64::NAN, |dist| dist.pdf(x))
}

/// `points` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Reject NaN and values outside [0, 1]
pub fn check_probability(quantity: &'static str, value: f64) -> Result<f64, IndeterminateError> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        Err(IndeterminateError { quantity, value })
    } else {
        Ok(value)
    }
}

/// Reject NaN and infinities
pub fn check_finite(quantity: &'static str, value: f64) -> Result<f64, IndeterminateError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IndeterminateError { quantity, value })
    }
}

/// Paired x/y coordinates of a density curve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DensityCurve {
    /// Grid positions
    pub x: Vec<f64>,
    /// Density at each grid position
    pub y: Vec<f64>,
}

impl DensityCurve {
    /// Normal density over `mean ± 4·sd`
    ///
    /// A zero standard deviation collapses to a single point at the mean.
    pub fn normal(mean: f64, sd: f64, points: usize) -> Self {
        let dist = match Normal::new(mean, sd) {
            Ok(dist) if sd > 0.0 && sd.is_finite() => dist,
            _ => {
                return Self {
                    x: vec![mean],
                    y: vec![0.0],
                };
            }
        };

        let x = linspace(
            mean - CURVE_HALF_WIDTH_SDS * sd,
            mean + CURVE_HALF_WIDTH_SDS * sd,
            points,
        );
        let y = x.iter().map(|&v| dist.pdf(v)).collect();
        Self { x, y }
    }

    /// Normalised histogram density, one point per bin centre
    pub fn from_samples(samples: &[f64], bins: usize) -> Self {
        if samples.is_empty() || bins == 0 {
            return Self::default();
        }

        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / bins as f64;

        if width <= 0.0 {
            return Self {
                x: vec![min],
                y: vec![1.0],
            };
        }

        let mut counts = vec![0usize; bins];
        for &s in samples {
            // max lands exactly on the upper edge
            let idx = (((s - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let scale = 1.0 / (samples.len() as f64 * width);
        let x = (0..bins).map(|i| min + width * (i as f64 + 0.5)).collect();
        let y = counts.iter().map(|&c| c as f64 * scale).collect();
        Self { x, y }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the curve has no points
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Highest density on the curve
    pub fn peak(&self) -> f64 {
        self.y.iter().copied().fold(0.0, f64::max)
    }

    /// Approximate area under the curve (trapezoid rule)
    pub fn area(&self) -> f64 {
        self.x
            .windows(2)
            .zip(self.y.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
            .sum()
    }
}
