//! Bayesian Analysis
//!
//! Beta-Binomial posterior comparison. Each variant's conversion rate gets a
//! `Beta(conversions + 1, visitors - conversions + 1)` posterior (uniform prior);
//! paired draws from the two posteriors estimate the probability that each
//! variant is better and the credible range of the lift.
//!
//! Sampling is seeded: the same seed always reproduces the same draws.

use crate::input::{InputError, TestInput, Variant};
use crate::normal::DensityCurve;
use crate::summary::{PosteriorSummary, summarize_draws};
use crate::visualization::{DifferencePlot, PosteriorPlot};
use crate::{DEFAULT_CREDIBLE_LEVEL, DEFAULT_DENSITY_BINS, DEFAULT_POSTERIOR_SAMPLES};
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};
use rand_xoshiro::Xoshiro256PlusPlus;
use thiserror::Error;
use tracing::debug;

/// Configuration for posterior simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BayesianConfig {
    /// Draws per posterior (default: 100,000)
    pub samples: usize,
    /// RNG seed; a random seed is drawn and reported back when `None`
    pub seed: Option<u64>,
    /// Mass of the credible interval for the difference (default: 0.95)
    pub credible_level: f64,
    /// Histogram bins for the density plots
    pub density_bins: usize,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_POSTERIOR_SAMPLES,
            seed: None,
            credible_level: DEFAULT_CREDIBLE_LEVEL,
            density_bins: DEFAULT_DENSITY_BINS,
        }
    }
}

/// Errors from Bayesian analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BayesianError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(
        "conversion rate for variant {variant} must lie strictly between 0 and 1 for the Bayesian model (got {rate})"
    )]
    DegenerateRate { variant: Variant, rate: f64 },

    #[error("posterior sample count must be at least 1")]
    InvalidSampleCount,

    #[error("credible level must lie strictly between 0 and 1 (got {0})")]
    InvalidCredibleLevel(f64),

    #[error("invalid Beta posterior: {0}")]
    Distribution(String),
}

/// Beta posterior of one conversion rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaPosterior {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaPosterior {
    /// Posterior of one variant under a uniform Beta(1, 1) prior
    pub fn from_input(input: &TestInput, variant: Variant) -> Self {
        // validated input guarantees conversions <= visitors
        let conversions = input.conversions(variant);
        let failures = input.visitors(variant) - conversions;
        Self {
            alpha: conversions as f64 + 1.0,
            beta: failures as f64 + 1.0,
        }
    }

    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    pub fn variance(&self) -> f64 {
        let total = self.alpha + self.beta;
        self.alpha * self.beta / (total * total * (total + 1.0))
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>, BayesianError> {
        let dist = Beta::new(self.alpha, self.beta)
            .map_err(|e| BayesianError::Distribution(e.to_string()))?;
        Ok(dist.sample_iter(rng).take(n).collect())
    }
}

/// Probability of each variant having the higher true conversion rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    pub prob_a: f64,
    pub prob_b: f64,
}

/// Paired posterior draws for A and B
///
/// Both sequences have the same length; index `i` of each forms one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorSamples {
    control: Vec<f64>,
    variant: Vec<f64>,
    seed: u64,
}

impl PosteriorSamples {
    /// Draws from A's posterior
    pub fn control(&self) -> &[f64] {
        &self.control
    }

    /// Draws from B's posterior
    pub fn variant(&self) -> &[f64] {
        &self.variant
    }

    /// Seed that produced these draws
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.control.len()
    }

    pub fn is_empty(&self) -> bool {
        self.control.is_empty()
    }

    /// Elementwise `B - A`
    pub fn difference(&self) -> Vec<f64> {
        self.variant
            .iter()
            .zip(&self.control)
            .map(|(b, a)| b - a)
            .collect()
    }

    /// Fraction of pairs where B beats A, and its complement
    pub fn probabilities(&self) -> Probabilities {
        let wins_b = self
            .variant
            .iter()
            .zip(&self.control)
            .filter(|(b, a)| b > a)
            .count();
        let prob_b = wins_b as f64 / self.len() as f64;

        Probabilities {
            prob_a: 1.0 - prob_b,
            prob_b,
        }
    }
}

/// Complete Bayesian result
#[derive(Debug, Clone, PartialEq)]
pub struct BayesianResult {
    pub control_cr: f64,
    pub variant_cr: f64,
    pub relative_difference: f64,
    /// Probability that A is better
    pub prob_a: f64,
    /// Probability that B is better
    pub prob_b: f64,
    pub control_posterior: BetaPosterior,
    pub variant_posterior: BetaPosterior,
    /// Summary of the simulated `B - A` differences
    pub difference: PosteriorSummary,
    pub samples: PosteriorSamples,
}

impl BayesianResult {
    /// Seed used for the simulation
    pub fn seed(&self) -> u64 {
        self.samples.seed
    }

    /// Posterior density of each conversion rate
    pub fn posterior_plot(&self, bins: usize) -> PosteriorPlot {
        PosteriorPlot {
            control: DensityCurve::from_samples(&self.samples.control, bins),
            variant: DensityCurve::from_samples(&self.samples.variant, bins),
        }
    }

    /// Density of the simulated difference with its credible range
    pub fn difference_plot(&self, bins: usize) -> DifferencePlot {
        DifferencePlot {
            density: DensityCurve::from_samples(&self.samples.difference(), bins),
            credible_interval: self.difference.credible_interval,
            zero_marker: 0.0,
        }
    }
}

/// Posterior simulation over one test input
#[derive(Debug, Clone)]
pub struct BayesianEngine {
    input: TestInput,
    control_cr: f64,
    variant_cr: f64,
}

impl BayesianEngine {
    /// Build the engine, rejecting conversion rates of exactly 0 or 1
    pub fn new(input: TestInput) -> Result<Self, BayesianError> {
        let control_cr = interior_rate(&input, Variant::A)?;
        let variant_cr = interior_rate(&input, Variant::B)?;

        Ok(Self {
            input,
            control_cr,
            variant_cr,
        })
    }

    /// Validate raw counts and build the engine
    pub fn from_counts(
        visitors_a: u64,
        conversions_a: u64,
        visitors_b: u64,
        conversions_b: u64,
    ) -> Result<Self, BayesianError> {
        let input = TestInput::new(visitors_a, conversions_a, visitors_b, conversions_b)?;
        Self::new(input)
    }

    pub fn input(&self) -> &TestInput {
        &self.input
    }

    pub fn control_cr(&self) -> f64 {
        self.control_cr
    }

    pub fn variant_cr(&self) -> f64 {
        self.variant_cr
    }

    /// `variant_cr / control_cr - 1`; always defined since `control_cr > 0`
    pub fn relative_difference(&self) -> f64 {
        self.variant_cr / self.control_cr - 1.0
    }

    /// Posterior of a variant's conversion rate
    pub fn posterior(&self, variant: Variant) -> BetaPosterior {
        BetaPosterior::from_input(&self.input, variant)
    }

    /// Draw `n_samples` values from each posterior
    pub fn generate_posterior_samples(
        &self,
        n_samples: usize,
        seed: u64,
    ) -> Result<PosteriorSamples, BayesianError> {
        if n_samples == 0 {
            return Err(BayesianError::InvalidSampleCount);
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let control = self.posterior(Variant::A).sample(n_samples, &mut rng)?;
        let variant = self.posterior(Variant::B).sample(n_samples, &mut rng)?;

        Ok(PosteriorSamples {
            control,
            variant,
            seed,
        })
    }

    /// Simulate, compare and summarise in one call
    pub fn analyze(&self, config: &BayesianConfig) -> Result<BayesianResult, BayesianError> {
        if !(config.credible_level > 0.0 && config.credible_level < 1.0) {
            return Err(BayesianError::InvalidCredibleLevel(config.credible_level));
        }

        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        let samples = self.generate_posterior_samples(config.samples, seed)?;
        let Probabilities { prob_a, prob_b } = samples.probabilities();
        let difference = summarize_draws(&samples.difference(), config.credible_level);

        debug!(
            seed,
            samples = samples.len(),
            prob_a,
            prob_b,
            difference_mean = difference.mean,
            "bayesian analysis complete"
        );

        Ok(BayesianResult {
            control_cr: self.control_cr,
            variant_cr: self.variant_cr,
            relative_difference: self.relative_difference(),
            prob_a,
            prob_b,
            control_posterior: self.posterior(Variant::A),
            variant_posterior: self.posterior(Variant::B),
            difference,
            samples,
        })
    }
}

/// Run a Bayesian analysis
pub fn run_bayesian(
    input: &TestInput,
    config: &BayesianConfig,
) -> Result<BayesianResult, BayesianError> {
    BayesianEngine::new(*input)?.analyze(config)
}

fn interior_rate(input: &TestInput, variant: Variant) -> Result<f64, BayesianError> {
    let rate = input.conversion_rate(variant);
    if rate > 0.0 && rate < 1.0 {
        Ok(rate)
    } else {
        Err(BayesianError::DegenerateRate { variant, rate })
    }
}
