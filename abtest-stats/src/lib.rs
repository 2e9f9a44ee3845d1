#![warn(missing_docs)]
//! abtest Statistical Engine
//!
//! Compares the conversion rates of two variants with two independent methods:
//! - Frequentist: pooled two-proportion Z-test, one- or two-tailed, with post-hoc power
//! - Bayesian: Beta-Binomial posteriors, seeded simulation, probability of being better
//!
//! Both engines are built from the same validated [`TestInput`] and expose the
//! coordinate series a front end needs to draw the test, power, posterior and
//! difference charts.

mod bayesian;
mod frequentist;
mod input;
mod normal;
mod summary;
mod visualization;

pub use bayesian::{
    BayesianConfig, BayesianEngine, BayesianError, BayesianResult, BetaPosterior,
    PosteriorSamples, Probabilities, run_bayesian,
};
pub use frequentist::{
    Direction, FrequentistConfig, FrequentistEngine, FrequentistError, FrequentistResult,
    TailDirection, Verdict, ZTest, run_frequentist,
};
pub use input::{InputError, TestInput, Variant};
pub use normal::{
    DensityCurve, IndeterminateError, check_probability, linspace, normal_cdf, normal_pdf,
    normal_quantile,
};
pub use summary::{CredibleInterval, PosteriorSummary, summarize_draws};
pub use visualization::{
    DifferencePlot, PosteriorPlot, PowerPlot, RejectionRegion, TestVisualisation,
};

/// Default Type I error rate
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default number of draws per posterior
pub const DEFAULT_POSTERIOR_SAMPLES: usize = 100_000;

/// Default credible level for the difference interval (95%)
pub const DEFAULT_CREDIBLE_LEVEL: f64 = 0.95;

/// Default grid size for normal density curves
pub const DEFAULT_CURVE_POINTS: usize = 1_000;

/// Default histogram bins for posterior densities
pub const DEFAULT_DENSITY_BINS: usize = 100;
