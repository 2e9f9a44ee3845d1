#![warn(missing_docs)]
//! # abtest
//!
//! A/B test calculator comparing the conversion rates of a control (A) and a
//! variant (B) with two independent methods:
//! - **Frequentist**: pooled two-proportion Z-test, one- or two-tailed, with p-value,
//!   critical value and post-hoc statistical power
//! - **Bayesian**: Beta-Binomial posteriors, seeded Monte Carlo simulation, probability
//!   of each variant being better and a credible range for the difference
//! - **Plot series**: coordinates for the test, power, posterior and difference charts
//! - **Reports**: JSON and CSV output with a versioned schema
//!
//! ## Quick Start
//!
//! ```
//! use abtest::{FrequentistConfig, FrequentistEngine};
//!
//! let engine = FrequentistEngine::from_counts(
//!     50_000, 1_500, 50_000, 1_560,
//!     FrequentistConfig::default(),
//! ).unwrap();
//! let result = engine.analyze().unwrap();
//! assert!(!result.is_significant());
//! ```
//!
//! ## Reproducible Simulation
//!
//! ```
//! use abtest::{BayesianConfig, BayesianEngine};
//!
//! let engine = BayesianEngine::from_counts(1_000, 100, 1_000, 130).unwrap();
//! let config = BayesianConfig { samples: 10_000, seed: Some(42), ..Default::default() };
//! let first = engine.analyze(&config).unwrap();
//! let second = engine.analyze(&config).unwrap();
//! assert_eq!(first.prob_b, second.prob_b);
//! ```

// Re-export engines and input types
pub use abtest_stats::{
    BayesianConfig, BayesianEngine, BayesianError, BayesianResult, BetaPosterior,
    CredibleInterval, DensityCurve, DifferencePlot, Direction, FrequentistConfig,
    FrequentistEngine, FrequentistError, FrequentistResult, IndeterminateError, InputError,
    PosteriorPlot, PosteriorSamples, PosteriorSummary, PowerPlot, Probabilities, RejectionRegion,
    TailDirection, TestInput, TestVisualisation, Variant, Verdict, ZTest, run_bayesian,
    run_frequentist,
};

// Re-export defaults
pub use abtest_stats::{
    DEFAULT_ALPHA, DEFAULT_CREDIBLE_LEVEL, DEFAULT_CURVE_POINTS, DEFAULT_DENSITY_BINS,
    DEFAULT_POSTERIOR_SAMPLES,
};

// Re-export report types
pub use abtest_report::{
    AnalysisMethod, OutputFormat, Report, generate_csv_report, generate_json_report,
    parse_json_report,
};

pub use abtest_cli::{AnalysisSettings, build_report, format_human_output};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BayesianConfig, BayesianEngine, FrequentistConfig, FrequentistEngine, TestInput, Variant,
        Verdict,
    };
}

/// Run the abtest CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() {
///     abtest::run().unwrap();
/// }
/// ```
pub use abtest_cli::run;
