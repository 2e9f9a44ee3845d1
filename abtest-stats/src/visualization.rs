//! Plot Series
//!
//! Coordinate data for the four charts a front end draws. Nothing here renders;
//! each struct carries the curves plus the boundaries needed to shade them.

use crate::normal::DensityCurve;
use crate::summary::CredibleInterval;

/// Part of the x axis to shade under a curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectionRegion {
    /// Everything right of the boundary
    Above(f64),
    /// Everything left of the boundary
    Below(f64),
    /// Both tails
    Outside { lower: f64, upper: f64 },
}

impl RejectionRegion {
    /// Whether `x` falls in the shaded area
    pub fn contains(&self, x: f64) -> bool {
        match *self {
            RejectionRegion::Above(b) => x > b,
            RejectionRegion::Below(b) => x < b,
            RejectionRegion::Outside { lower, upper } => x < lower || x > upper,
        }
    }

    /// Boundary positions, in ascending order
    pub fn boundaries(&self) -> Vec<f64> {
        match *self {
            RejectionRegion::Above(b) | RejectionRegion::Below(b) => vec![b],
            RejectionRegion::Outside { lower, upper } => vec![lower, upper],
        }
    }

    /// Mask over a curve's x grid: true where the curve is shaded
    pub fn mask(&self, curve: &DensityCurve) -> Vec<bool> {
        curve.x.iter().map(|&x| self.contains(x)).collect()
    }
}

/// "Test visualisation": the difference in means expected under the null hypothesis
#[derive(Debug, Clone, PartialEq)]
pub struct TestVisualisation {
    /// Normal density centred at 0 with scale `se_difference`
    pub null_curve: DensityCurve,
    /// Observed `variant_cr - control_cr`, drawn as a marker line
    pub observed_difference: f64,
    /// Observed relative uplift, used for the marker label
    pub observed_relative_difference: Option<f64>,
    /// Shaded rejection region
    pub rejection_region: RejectionRegion,
    /// Control conversion rate; the x axis is labelled as `x / control_cr`
    pub control_cr: f64,
}

/// "Power": per-variant sampling distributions with the critical boundary
#[derive(Debug, Clone, PartialEq)]
pub struct PowerPlot {
    /// Normal approximation for A, centred at `control_cr` with scale `control_se`
    pub control_curve: DensityCurve,
    /// Normal approximation for B, centred at `variant_cr` with scale `variant_se`
    pub variant_curve: DensityCurve,
    /// Critical value line(s) drawn against A's distribution
    pub critical_boundary: RejectionRegion,
    /// Region of B's curve shaded as power
    pub power_region: RejectionRegion,
    /// Observed power, shown as an annotation
    pub power: f64,
}

/// Posterior densities of both conversion rates
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorPlot {
    pub control: DensityCurve,
    pub variant: DensityCurve,
}

/// Simulated difference `B - A` with its credible range
#[derive(Debug, Clone, PartialEq)]
pub struct DifferencePlot {
    pub density: DensityCurve,
    pub credible_interval: CredibleInterval,
    /// Position of the "no difference" marker
    pub zero_marker: f64,
}
