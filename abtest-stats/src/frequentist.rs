//! Frequentist Analysis
//!
//! Two-proportion Z-test with post-hoc power. All quantities derive from the
//! immutable [`TestInput`] and [`FrequentistConfig`]; every method takes `&self`
//! and can be called in any order.

use crate::input::{InputError, TestInput, Variant};
use crate::normal::{
    DensityCurve, IndeterminateError, check_finite, check_probability, normal_cdf,
    normal_quantile,
};
use crate::visualization::{PowerPlot, RejectionRegion, TestVisualisation};
use crate::DEFAULT_ALPHA;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Frequentist test configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequentistConfig {
    /// Type I error rate (default: 0.05)
    pub alpha: f64,
    /// Two-tailed test (default: true)
    pub two_tailed: bool,
}

impl Default for FrequentistConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            two_tailed: true,
        }
    }
}

/// Side(s) of the null distribution treated as the rejection region
///
/// One-tailed tests point toward the observed effect: `Left` tests for an
/// increase, `Right` for a decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailDirection {
    Left,
    Right,
    Two,
}

impl TailDirection {
    /// Pick the direction from the tails flag and the sign of the observed difference
    pub fn from_observed(two_tailed: bool, observed_difference: f64) -> Self {
        if two_tailed {
            TailDirection::Two
        } else if observed_difference < 0.0 {
            TailDirection::Right
        } else {
            TailDirection::Left
        }
    }

    /// p-value of a Z statistic
    pub fn p_value(self, z_score: f64) -> f64 {
        match self {
            TailDirection::Left => normal_cdf(-z_score),
            TailDirection::Right => normal_cdf(z_score),
            TailDirection::Two => 2.0 * normal_cdf(-z_score.abs()),
        }
    }

    /// Rejection region around `centre`, `half_width` away from it
    pub fn rejection_region(self, centre: f64, half_width: f64) -> RejectionRegion {
        match self {
            TailDirection::Left => RejectionRegion::Above(centre + half_width),
            TailDirection::Right => RejectionRegion::Below(centre - half_width),
            TailDirection::Two => RejectionRegion::Outside {
                lower: centre - half_width,
                upper: centre + half_width,
            },
        }
    }

    /// Whether the test is two-tailed
    pub fn is_two_tailed(self) -> bool {
        matches!(self, TailDirection::Two)
    }
}

impl std::fmt::Display for TailDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TailDirection::Left => write!(f, "left"),
            TailDirection::Right => write!(f, "right"),
            TailDirection::Two => write!(f, "two"),
        }
    }
}

/// Direction of a significant difference, B relative to A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Higher,
    Lower,
}

/// Outcome of the significance test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Significant { direction: Direction },
    NotSignificant,
}

/// Z statistic and its p-value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZTest {
    pub z_score: f64,
    pub p_value: f64,
    /// Pooled standard error used as the denominator
    pub combined_se: f64,
}

/// Complete frequentist result
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentistResult {
    pub control_cr: f64,
    pub variant_cr: f64,
    /// `variant_cr / control_cr - 1`; `None` when A has no conversions
    pub relative_difference: Option<f64>,
    pub control_se: f64,
    pub variant_se: f64,
    pub se_difference: f64,
    pub combined_se: f64,
    pub z_score: f64,
    pub p_value: f64,
    pub power: f64,
    pub z_critical: f64,
    pub tail_direction: TailDirection,
    pub alpha: f64,
    pub verdict: Verdict,
}

impl FrequentistResult {
    /// Whether `p_value < alpha`
    pub fn is_significant(&self) -> bool {
        matches!(self.verdict, Verdict::Significant { .. })
    }

    /// Confidence level, `1 - alpha`
    pub fn confidence(&self) -> f64 {
        1.0 - self.alpha
    }

    /// Probability of a false negative, `1 - power`
    pub fn type_ii_error(&self) -> f64 {
        1.0 - self.power
    }

    /// Relative difference that would have reached significance
    ///
    /// `se_difference · z_critical / control_cr`; `None` when A has no conversions.
    pub fn minimum_detectable_lift(&self) -> Option<f64> {
        if self.control_cr > 0.0 {
            Some(self.se_difference * self.z_critical / self.control_cr)
        } else {
            None
        }
    }
}

/// Errors from frequentist analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrequentistError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("alpha must lie strictly between 0 and 1 (got {0})")]
    InvalidAlpha(f64),

    #[error(transparent)]
    Indeterminate(#[from] IndeterminateError),
}

/// Z-test and power analysis over one test input
#[derive(Debug, Clone)]
pub struct FrequentistEngine {
    input: TestInput,
    config: FrequentistConfig,
    control_cr: f64,
    variant_cr: f64,
    control_se: f64,
    variant_se: f64,
    se_difference: f64,
    tail_direction: TailDirection,
}

impl FrequentistEngine {
    /// Derive conversion rates, standard errors and tail direction
    pub fn new(input: TestInput, config: FrequentistConfig) -> Result<Self, FrequentistError> {
        if !(config.alpha > 0.0 && config.alpha < 1.0) {
            return Err(FrequentistError::InvalidAlpha(config.alpha));
        }

        let control_cr = input.control_cr();
        let variant_cr = input.variant_cr();
        let control_se = binomial_se(control_cr, input.visitors(Variant::A));
        let variant_se = binomial_se(variant_cr, input.visitors(Variant::B));
        let se_difference = (control_se.powi(2) + variant_se.powi(2)).sqrt();
        let tail_direction =
            TailDirection::from_observed(config.two_tailed, variant_cr - control_cr);

        Ok(Self {
            input,
            config,
            control_cr,
            variant_cr,
            control_se,
            variant_se,
            se_difference,
            tail_direction,
        })
    }

    /// Validate raw counts and build the engine
    pub fn from_counts(
        visitors_a: u64,
        conversions_a: u64,
        visitors_b: u64,
        conversions_b: u64,
        config: FrequentistConfig,
    ) -> Result<Self, FrequentistError> {
        let input = TestInput::new(visitors_a, conversions_a, visitors_b, conversions_b)?;
        Self::new(input, config)
    }

    /// The input this engine was built from
    pub fn input(&self) -> &TestInput {
        &self.input
    }

    pub fn control_cr(&self) -> f64 {
        self.control_cr
    }

    pub fn variant_cr(&self) -> f64 {
        self.variant_cr
    }

    pub fn relative_difference(&self) -> Option<f64> {
        self.input.relative_difference()
    }

    pub fn control_se(&self) -> f64 {
        self.control_se
    }

    pub fn variant_se(&self) -> f64 {
        self.variant_se
    }

    /// Standard error of the difference in means
    pub fn se_difference(&self) -> f64 {
        self.se_difference
    }

    pub fn tail_direction(&self) -> TailDirection {
        self.tail_direction
    }

    pub fn alpha(&self) -> f64 {
        self.config.alpha
    }

    /// Pooled two-proportion Z-test
    pub fn z_test(&self) -> Result<ZTest, FrequentistError> {
        let combined_cr = self.input.total_conversions() / self.input.total_visitors();
        let visitors_a = self.input.visitors(Variant::A) as f64;
        let visitors_b = self.input.visitors(Variant::B) as f64;
        let combined_se =
            (combined_cr * (1.0 - combined_cr) * (1.0 / visitors_a + 1.0 / visitors_b)).sqrt();

        let z_score = check_finite("z-score", (self.variant_cr - self.control_cr) / combined_se)?;
        let p_value = check_probability("p-value", self.tail_direction.p_value(z_score))?;

        Ok(ZTest {
            z_score,
            p_value,
            combined_se,
        })
    }

    /// Post-hoc power at the observed effect size
    pub fn power(&self) -> Result<f64, FrequentistError> {
        let n = self.input.total_visitors();
        let qu = self.critical_z_value();

        let diff = (self.variant_cr - self.control_cr).abs();
        let avg_cr = (self.control_cr + self.variant_cr) / 2.0;

        let control_var = self.control_cr * (1.0 - self.control_cr);
        let variant_var = self.variant_cr * (1.0 - self.variant_cr);
        let avg_var = avg_cr * (1.0 - avg_cr);

        let spread = (control_var + variant_var).sqrt();
        let margin = qu * (2.0 * avg_var).sqrt();

        let power_lower = normal_cdf((n.sqrt() * diff - margin) / spread);
        let power_upper = 1.0 - normal_cdf((n.sqrt() * diff + margin) / spread);

        Ok(check_probability("power", power_lower + power_upper)?)
    }

    /// Critical Z value: `Φ⁻¹(1 - alpha/2)` two-tailed, `Φ⁻¹(1 - alpha)` one-tailed
    pub fn critical_z_value(&self) -> f64 {
        let tail_alpha = if self.tail_direction.is_two_tailed() {
            self.config.alpha / 2.0
        } else {
            self.config.alpha
        };
        normal_quantile(1.0 - tail_alpha)
    }

    /// Run the test, power and critical value in one call
    pub fn analyze(&self) -> Result<FrequentistResult, FrequentistError> {
        let z_test = self.z_test()?;
        let power = self.power()?;
        let z_critical = self.critical_z_value();

        let verdict = if z_test.p_value < self.config.alpha {
            let direction = if self.variant_cr < self.control_cr {
                Direction::Lower
            } else {
                Direction::Higher
            };
            Verdict::Significant { direction }
        } else {
            Verdict::NotSignificant
        };

        debug!(
            z_score = z_test.z_score,
            p_value = z_test.p_value,
            power,
            z_critical,
            tail = %self.tail_direction,
            "frequentist analysis complete"
        );

        Ok(FrequentistResult {
            control_cr: self.control_cr,
            variant_cr: self.variant_cr,
            relative_difference: self.relative_difference(),
            control_se: self.control_se,
            variant_se: self.variant_se,
            se_difference: self.se_difference,
            combined_se: z_test.combined_se,
            z_score: z_test.z_score,
            p_value: z_test.p_value,
            power,
            z_critical,
            tail_direction: self.tail_direction,
            alpha: self.config.alpha,
            verdict,
        })
    }

    /// Null distribution of the difference with its rejection region
    pub fn test_visualisation(&self, points: usize) -> TestVisualisation {
        let z_critical = self.critical_z_value();

        TestVisualisation {
            null_curve: DensityCurve::normal(0.0, self.se_difference, points),
            observed_difference: self.variant_cr - self.control_cr,
            observed_relative_difference: self.relative_difference(),
            rejection_region: self
                .tail_direction
                .rejection_region(0.0, self.se_difference * z_critical),
            control_cr: self.control_cr,
        }
    }

    /// Per-variant distributions with the critical boundary and power region
    pub fn power_plot(&self, points: usize) -> Result<PowerPlot, FrequentistError> {
        let power = self.power()?;
        let half_width = self.control_se * self.critical_z_value();

        let power_region = if self.variant_cr > self.control_cr {
            RejectionRegion::Above(self.control_cr + half_width)
        } else {
            RejectionRegion::Below(self.control_cr - half_width)
        };

        Ok(PowerPlot {
            control_curve: DensityCurve::normal(self.control_cr, self.control_se, points),
            variant_curve: DensityCurve::normal(self.variant_cr, self.variant_se, points),
            critical_boundary: self
                .tail_direction
                .rejection_region(self.control_cr, half_width),
            power_region,
            power,
        })
    }
}

/// Run a frequentist analysis
pub fn run_frequentist(
    input: &TestInput,
    config: &FrequentistConfig,
) -> Result<FrequentistResult, FrequentistError> {
    FrequentistEngine::new(*input, *config)?.analyze()
}

/// Binomial standard error, `sqrt(p(1-p)/n)`
fn binomial_se(rate: f64, visitors: u64) -> f64 {
    (rate * (1.0 - rate) / visitors as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(va: u64, ca: u64, vb: u64, cb: u64, two_tailed: bool) -> FrequentistEngine {
        let input = TestInput::new(va, ca, vb, cb).unwrap();
        let config = FrequentistConfig {
            alpha: 0.05,
            two_tailed,
        };
        FrequentistEngine::new(input, config).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let e = engine(50_000, 1_500, 50_000, 1_560, true);
        let result = e.analyze().unwrap();

        assert!((result.control_cr - 0.03).abs() < 1e-12);
        assert!((result.variant_cr - 0.0312).abs() < 1e-12);
        assert!((result.relative_difference.unwrap() - 0.04).abs() < 1e-9);
        assert!((result.z_score - 1.1016).abs() < 1e-3);
        assert!((result.p_value - 0.2706).abs() < 1e-3);
        assert!((result.power - 0.3441).abs() < 2e-3);
        assert!((result.z_critical - 1.959963984540054).abs() < 1e-9);
        assert_eq!(result.tail_direction, TailDirection::Two);
        assert_eq!(result.verdict, Verdict::NotSignificant);
        assert!(!result.is_significant());
    }

    #[test]
    fn test_standard_errors() {
        let e = engine(50_000, 1_500, 50_000, 1_560, true);

        let control_se = (0.03f64 * 0.97 / 50_000.0).sqrt();
        let variant_se = (0.0312f64 * 0.9688 / 50_000.0).sqrt();
        assert!((e.control_se() - control_se).abs() < 1e-15);
        assert!((e.variant_se() - variant_se).abs() < 1e-15);
        assert!(
            (e.se_difference() - (control_se.powi(2) + variant_se.powi(2)).sqrt()).abs() < 1e-15
        );
    }

    #[test]
    fn test_tail_direction() {
        assert_eq!(
            engine(1000, 100, 1000, 120, false).tail_direction(),
            TailDirection::Left
        );
        assert_eq!(
            engine(1000, 100, 1000, 80, false).tail_direction(),
            TailDirection::Right
        );
        assert_eq!(
            engine(1000, 100, 1000, 80, true).tail_direction(),
            TailDirection::Two
        );
        // no difference counts as testing for an increase
        assert_eq!(
            engine(1000, 100, 1000, 100, false).tail_direction(),
            TailDirection::Left
        );
    }

    #[test]
    fn test_two_tailed_is_double_one_tailed() {
        let one = engine(10_000, 500, 10_000, 560, false).z_test().unwrap();
        let two = engine(10_000, 500, 10_000, 560, true).z_test().unwrap();

        assert!(one.z_score > 0.0);
        assert!((two.z_score - one.z_score).abs() < 1e-12);
        assert!((two.p_value - 2.0 * one.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_one_tailed_decrease() {
        let e = engine(10_000, 560, 10_000, 500, false);
        let z = e.z_test().unwrap();
        assert!(z.z_score < 0.0);
        assert!((z.p_value - normal_cdf(z.z_score)).abs() < 1e-15);
        assert!(z.p_value < 0.5);
    }

    #[test]
    fn test_p_value_decreases_with_z() {
        for direction in [TailDirection::Left, TailDirection::Two] {
            let mut previous = f64::INFINITY;
            for i in 0..40 {
                let z = i as f64 * 0.1;
                let p = direction.p_value(z);
                assert!(p < previous, "{direction}: p({z}) = {p} not below {previous}");
                previous = p;
            }
        }
        let mut previous = f64::INFINITY;
        for i in 0..40 {
            let p = TailDirection::Right.p_value(-(i as f64) * 0.1);
            assert!(p < previous);
            previous = p;
        }
    }

    #[test]
    fn test_power_grows_with_effect() {
        let mut previous = 0.0;
        for conversions_b in (1_500..=1_800).step_by(20) {
            let power = engine(50_000, 1_500, 50_000, conversions_b, true)
                .power()
                .unwrap();
            assert!(power >= previous - 1e-12, "power fell at {conversions_b}");
            previous = power;
        }
        assert!(previous > 0.99);

        let mut previous = 0.0;
        for conversions_b in (1_200..=1_500).rev().step_by(20) {
            let power = engine(50_000, 1_500, 50_000, conversions_b, true)
                .power()
                .unwrap();
            assert!(power >= previous - 1e-12);
            previous = power;
        }
    }

    #[test]
    fn test_power_without_effect_equals_alpha() {
        let power = engine(50_000, 1_500, 50_000, 1_500, true).power().unwrap();
        assert!((power - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_input() {
        let result = engine(20_000, 700, 20_000, 700, true).analyze().unwrap();

        assert_eq!(result.relative_difference, Some(0.0));
        assert_eq!(result.z_score, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
        assert_eq!(result.verdict, Verdict::NotSignificant);
    }

    #[test]
    fn test_significant_result() {
        let result = engine(50_000, 1_500, 50_000, 1_800, true).analyze().unwrap();
        assert!(result.p_value < 0.05);
        assert_eq!(
            result.verdict,
            Verdict::Significant {
                direction: Direction::Higher
            }
        );

        let result = engine(50_000, 1_800, 50_000, 1_500, true).analyze().unwrap();
        assert_eq!(
            result.verdict,
            Verdict::Significant {
                direction: Direction::Lower
            }
        );
    }

    #[test]
    fn test_critical_value_is_stable() {
        let e = engine(50_000, 1_500, 50_000, 1_560, true);
        let first = e.critical_z_value();
        let second = e.critical_z_value();
        assert_eq!(first, second);
        assert!((e.alpha() - 0.05).abs() < f64::EPSILON);

        let one_tailed = engine(50_000, 1_500, 50_000, 1_560, false);
        assert!((one_tailed.critical_z_value() - 1.6448536269514722).abs() < 1e-9);
    }

    #[test]
    fn test_derived_quantities() {
        let result = engine(50_000, 1_500, 50_000, 1_560, true).analyze().unwrap();

        assert!((result.confidence() - 0.95).abs() < 1e-12);
        assert!((result.type_ii_error() - (1.0 - result.power)).abs() < 1e-12);
        let mdl = result.minimum_detectable_lift().unwrap();
        assert!((mdl - result.se_difference * result.z_critical / 0.03).abs() < 1e-12);
        // the observed 4% lift falls short of what was needed
        assert!(mdl > 0.04);
    }

    #[test]
    fn test_full_conversion_accepted() {
        let result = engine(100, 100, 100, 90, true).analyze().unwrap();
        assert_eq!(result.control_cr, 1.0);
        assert_eq!(result.control_se, 0.0);
        assert!(result.p_value >= 0.0 && result.p_value <= 1.0);
    }

    #[test]
    fn test_zero_control_conversions() {
        let result = engine(1_000, 0, 1_000, 30, true).analyze().unwrap();
        assert!(result.relative_difference.is_none());
        assert!(result.minimum_detectable_lift().is_none());
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn test_degenerate_input_is_indeterminate() {
        let e = engine(1_000, 0, 1_000, 0, true);
        assert!(matches!(
            e.z_test(),
            Err(FrequentistError::Indeterminate(IndeterminateError {
                quantity: "z-score",
                ..
            }))
        ));
        assert!(matches!(e.power(), Err(FrequentistError::Indeterminate(_))));
        assert!(e.analyze().is_err());
    }

    #[test]
    fn test_zero_visitors_is_domain_error() {
        let err = FrequentistEngine::from_counts(0, 0, 100, 10, FrequentistConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FrequentistError::Input(InputError::ZeroVisitors {
                variant: Variant::A
            })
        ));
    }

    #[test]
    fn test_extreme_visitor_counts() {
        let input = TestInput::new(u64::MAX, 1, 10, 1).unwrap();
        let result = run_frequentist(&input, &FrequentistConfig::default()).unwrap();

        assert!(result.z_score.is_finite() && result.z_score > 0.0);
        assert!(result.p_value < 1e-9);
        assert!((0.0..=1.0).contains(&result.power));
    }

    #[test]
    fn test_invalid_alpha() {
        let input = TestInput::new(100, 10, 100, 12).unwrap();
        for alpha in [0.0, 1.0, -0.1, f64::NAN] {
            let config = FrequentistConfig {
                alpha,
                two_tailed: true,
            };
            assert!(matches!(
                FrequentistEngine::new(input, config),
                Err(FrequentistError::InvalidAlpha(_))
            ));
        }
    }

    #[test]
    fn test_visualisation_regions() {
        let e = engine(50_000, 1_500, 50_000, 1_560, true);
        let plot = e.test_visualisation(1000);
        let half = e.se_difference() * e.critical_z_value();

        assert_eq!(plot.null_curve.len(), 1000);
        assert!((plot.observed_difference - 0.0012).abs() < 1e-12);
        assert_eq!(
            plot.rejection_region,
            RejectionRegion::Outside {
                lower: -half,
                upper: half
            }
        );
        // the observed difference is not in the rejection region
        assert!(!plot.rejection_region.contains(plot.observed_difference));

        let left = engine(50_000, 1_500, 50_000, 1_560, false).test_visualisation(100);
        assert!(matches!(left.rejection_region, RejectionRegion::Above(b) if b > 0.0));
        let right = engine(50_000, 1_560, 50_000, 1_500, false).test_visualisation(100);
        assert!(matches!(right.rejection_region, RejectionRegion::Below(b) if b < 0.0));
    }

    #[test]
    fn test_power_plot() {
        let e = engine(50_000, 1_500, 50_000, 1_560, true);
        let plot = e.power_plot(500).unwrap();
        let half = e.control_se() * e.critical_z_value();

        assert_eq!(plot.control_curve.len(), 500);
        assert_eq!(plot.variant_curve.len(), 500);
        assert_eq!(plot.power_region, RejectionRegion::Above(0.03 + half));
        assert_eq!(plot.critical_boundary.boundaries(), vec![0.03 - half, 0.03 + half]);
        assert!((plot.power - e.power().unwrap()).abs() < f64::EPSILON);

        let lower = engine(50_000, 1_560, 50_000, 1_500, true).power_plot(10).unwrap();
        assert!(matches!(lower.power_region, RejectionRegion::Below(_)));
    }

    #[test]
    fn test_run_frequentist() {
        let input = TestInput::new(50_000, 1_500, 50_000, 1_560).unwrap();
        let result = run_frequentist(&input, &FrequentistConfig::default()).unwrap();
        assert_eq!(result.tail_direction, TailDirection::Two);
        assert!(result.p_value > 0.05);
    }
}
