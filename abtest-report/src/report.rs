//! Report Data Structures

use abtest_stats::{
    BayesianResult, BetaPosterior, DensityCurve, DifferencePlot, FrequentistResult,
    PosteriorPlot, PowerPlot, RejectionRegion, TailDirection, TestInput, TestVisualisation,
    Verdict,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report schema version, bumped on breaking layout changes
pub const SCHEMA_VERSION: u32 = 1;

/// Complete analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub input: TestInput,
    pub frequentist: Option<FrequentistReport>,
    pub bayesian: Option<BayesianReport>,
}

/// Which engines ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Frequentist,
    Bayesian,
    Both,
}

impl AnalysisMethod {
    /// Whether the Z-test runs
    pub fn runs_frequentist(self) -> bool {
        matches!(self, AnalysisMethod::Frequentist | AnalysisMethod::Both)
    }

    /// Whether the posterior simulation runs
    pub fn runs_bayesian(self) -> bool {
        matches!(self, AnalysisMethod::Bayesian | AnalysisMethod::Both)
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub method: AnalysisMethod,
}

/// Frequentist section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequentistReport {
    pub control_cr: f64,
    pub variant_cr: f64,
    pub relative_difference: Option<f64>,
    pub control_se: f64,
    pub variant_se: f64,
    pub se_difference: f64,
    pub combined_se: f64,
    pub z_score: f64,
    pub p_value: f64,
    pub power: f64,
    pub type_ii_error: f64,
    pub z_critical: f64,
    pub alpha: f64,
    pub confidence: f64,
    pub tail_direction: TailDirection,
    pub significant: bool,
    pub verdict: Verdict,
    /// Relative difference that would have been needed for significance
    pub minimum_detectable_lift: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plots: Option<FrequentistPlots>,
}

impl From<&FrequentistResult> for FrequentistReport {
    fn from(result: &FrequentistResult) -> Self {
        Self {
            control_cr: result.control_cr,
            variant_cr: result.variant_cr,
            relative_difference: result.relative_difference,
            control_se: result.control_se,
            variant_se: result.variant_se,
            se_difference: result.se_difference,
            combined_se: result.combined_se,
            z_score: result.z_score,
            p_value: result.p_value,
            power: result.power,
            type_ii_error: result.type_ii_error(),
            z_critical: result.z_critical,
            alpha: result.alpha,
            confidence: result.confidence(),
            tail_direction: result.tail_direction,
            significant: result.is_significant(),
            verdict: result.verdict,
            minimum_detectable_lift: result.minimum_detectable_lift(),
            plots: None, // Filled when plots are requested
        }
    }
}

/// The two frequentist charts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequentistPlots {
    pub test_visualisation: TestVisualisationSeries,
    pub power: PowerSeries,
}

impl FrequentistPlots {
    /// Collect both charts
    pub fn new(test: &TestVisualisation, power: &PowerPlot) -> Self {
        Self {
            test_visualisation: test.into(),
            power: power.into(),
        }
    }
}

/// x/y coordinates of one curve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl From<&DensityCurve> for CurveSeries {
    fn from(curve: &DensityCurve) -> Self {
        Self {
            x: curve.x.clone(),
            y: curve.y.clone(),
        }
    }
}

/// Shaded region of a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegionSeries {
    Above { boundary: f64 },
    Below { boundary: f64 },
    Outside { lower: f64, upper: f64 },
}

impl From<RejectionRegion> for RegionSeries {
    fn from(region: RejectionRegion) -> Self {
        match region {
            RejectionRegion::Above(boundary) => RegionSeries::Above { boundary },
            RejectionRegion::Below(boundary) => RegionSeries::Below { boundary },
            RejectionRegion::Outside { lower, upper } => RegionSeries::Outside { lower, upper },
        }
    }
}

/// "Test visualisation" chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVisualisationSeries {
    pub null_curve: CurveSeries,
    pub observed_difference: f64,
    pub observed_relative_difference: Option<f64>,
    pub rejection_region: RegionSeries,
    /// Divisor turning the x axis into relative difference
    pub control_cr: f64,
}

impl From<&TestVisualisation> for TestVisualisationSeries {
    fn from(plot: &TestVisualisation) -> Self {
        Self {
            null_curve: (&plot.null_curve).into(),
            observed_difference: plot.observed_difference,
            observed_relative_difference: plot.observed_relative_difference,
            rejection_region: plot.rejection_region.into(),
            control_cr: plot.control_cr,
        }
    }
}

/// "Power" chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSeries {
    pub control_curve: CurveSeries,
    pub variant_curve: CurveSeries,
    pub critical_boundary: RegionSeries,
    pub power_region: RegionSeries,
    pub power: f64,
}

impl From<&PowerPlot> for PowerSeries {
    fn from(plot: &PowerPlot) -> Self {
        Self {
            control_curve: (&plot.control_curve).into(),
            variant_curve: (&plot.variant_curve).into(),
            critical_boundary: plot.critical_boundary.into(),
            power_region: plot.power_region.into(),
            power: plot.power,
        }
    }
}

/// Bayesian section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianReport {
    pub control_cr: f64,
    pub variant_cr: f64,
    pub relative_difference: f64,
    pub prob_a: f64,
    pub prob_b: f64,
    pub seed: u64,
    pub samples: usize,
    pub control_posterior: PosteriorParams,
    pub variant_posterior: PosteriorParams,
    pub difference: DifferenceSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plots: Option<BayesianPlots>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_samples: Option<RawSamples>,
}

impl From<&BayesianResult> for BayesianReport {
    fn from(result: &BayesianResult) -> Self {
        let interval = result.difference.credible_interval;

        Self {
            control_cr: result.control_cr,
            variant_cr: result.variant_cr,
            relative_difference: result.relative_difference,
            prob_a: result.prob_a,
            prob_b: result.prob_b,
            seed: result.seed(),
            samples: result.samples.len(),
            control_posterior: result.control_posterior.into(),
            variant_posterior: result.variant_posterior.into(),
            difference: DifferenceSummary {
                mean: result.difference.mean,
                median: result.difference.median,
                std_dev: result.difference.std_dev,
                min: result.difference.min,
                max: result.difference.max,
                credible_lower: interval.lower,
                credible_upper: interval.upper,
                credible_level: interval.level,
                excludes_zero: interval.excludes_zero(),
            },
            plots: None,
            raw_samples: None,
        }
    }
}

/// Beta posterior parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PosteriorParams {
    pub alpha: f64,
    pub beta: f64,
    pub mean: f64,
}

impl From<BetaPosterior> for PosteriorParams {
    fn from(posterior: BetaPosterior) -> Self {
        Self {
            alpha: posterior.alpha,
            beta: posterior.beta,
            mean: posterior.mean(),
        }
    }
}

/// Summary of the simulated `B - A` difference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferenceSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub credible_lower: f64,
    pub credible_upper: f64,
    pub credible_level: f64,
    /// Zero lies outside the credible interval
    pub excludes_zero: bool,
}

/// The two Bayesian charts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianPlots {
    pub posterior_control: CurveSeries,
    pub posterior_variant: CurveSeries,
    pub difference: CurveSeries,
    pub difference_credible_lower: f64,
    pub difference_credible_upper: f64,
    pub zero_marker: f64,
}

impl BayesianPlots {
    /// Collect both charts
    pub fn new(posteriors: &PosteriorPlot, difference: &DifferencePlot) -> Self {
        Self {
            posterior_control: (&posteriors.control).into(),
            posterior_variant: (&posteriors.variant).into(),
            difference: (&difference.density).into(),
            difference_credible_lower: difference.credible_interval.lower,
            difference_credible_upper: difference.credible_interval.upper,
            zero_marker: difference.zero_marker,
        }
    }
}

/// Raw posterior draws, only embedded on request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSamples {
    pub control: Vec<f64>,
    pub variant: Vec<f64>,
}
