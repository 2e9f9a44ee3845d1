//! Analysis Execution
//!
//! Runs the selected engines over one test input and assembles the report
//! sections, attaching plot series and raw draws when requested.

use super::metadata::build_report_meta;
use abtest_report::{
    AnalysisMethod, BayesianPlots, BayesianReport, FrequentistPlots, FrequentistReport,
    RawSamples, Report,
};
use abtest_stats::{
    BayesianConfig, BayesianEngine, BayesianError, DEFAULT_CURVE_POINTS, FrequentistConfig,
    FrequentistEngine, TestInput, Variant,
};
use anyhow::Context;
use tracing::{info, warn};

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Engines to run
    pub method: AnalysisMethod,
    /// Z-test settings
    pub frequentist: FrequentistConfig,
    /// Posterior simulation settings
    pub bayesian: BayesianConfig,
    /// Grid size of the frequentist normal curves
    pub curve_points: usize,
    /// Attach plot series to the report
    pub plots: bool,
    /// Attach raw posterior draws to the report
    pub include_samples: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            method: AnalysisMethod::Both,
            frequentist: FrequentistConfig::default(),
            bayesian: BayesianConfig::default(),
            curve_points: DEFAULT_CURVE_POINTS,
            plots: false,
            include_samples: false,
        }
    }
}

/// Run the configured engines and build the complete report
///
/// With [`AnalysisMethod::Both`], an input the Beta model cannot handle (a
/// conversion rate of exactly 0 or 1) drops the Bayesian section with a
/// warning instead of failing the whole run.
pub fn build_report(input: TestInput, settings: &AnalysisSettings) -> anyhow::Result<Report> {
    info!(
        method = ?settings.method,
        visitors_a = input.visitors(Variant::A),
        visitors_b = input.visitors(Variant::B),
        "running analysis"
    );

    let frequentist = if settings.method.runs_frequentist() {
        Some(run_frequentist_section(input, settings).context("frequentist analysis failed")?)
    } else {
        None
    };

    let bayesian = if settings.method.runs_bayesian() {
        match run_bayesian_section(input, settings) {
            Ok(section) => Some(section),
            Err(BayesianError::DegenerateRate { variant, rate })
                if settings.method == AnalysisMethod::Both =>
            {
                warn!(%variant, rate, "skipping Bayesian analysis: rate on the boundary");
                None
            }
            Err(e) => return Err(anyhow::Error::new(e).context("bayesian analysis failed")),
        }
    } else {
        None
    };

    Ok(Report {
        meta: build_report_meta(settings.method),
        input,
        frequentist,
        bayesian,
    })
}

fn run_frequentist_section(
    input: TestInput,
    settings: &AnalysisSettings,
) -> anyhow::Result<FrequentistReport> {
    let engine = FrequentistEngine::new(input, settings.frequentist)?;
    let result = engine.analyze()?;
    let mut report = FrequentistReport::from(&result);

    if settings.plots {
        let test = engine.test_visualisation(settings.curve_points);
        let power = engine.power_plot(settings.curve_points)?;
        report.plots = Some(FrequentistPlots::new(&test, &power));
    }

    Ok(report)
}

fn run_bayesian_section(
    input: TestInput,
    settings: &AnalysisSettings,
) -> Result<BayesianReport, BayesianError> {
    let engine = BayesianEngine::new(input)?;
    let result = engine.analyze(&settings.bayesian)?;
    let mut report = BayesianReport::from(&result);

    if settings.plots {
        let bins = settings.bayesian.density_bins;
        report.plots = Some(BayesianPlots::new(
            &result.posterior_plot(bins),
            &result.difference_plot(bins),
        ));
    }

    if settings.include_samples {
        report.raw_samples = Some(RawSamples {
            control: result.samples.control().to_vec(),
            variant: result.samples.variant().to_vec(),
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(method: AnalysisMethod) -> AnalysisSettings {
        AnalysisSettings {
            method,
            bayesian: BayesianConfig {
                samples: 2_000,
                seed: Some(11),
                ..Default::default()
            },
            curve_points: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_both_sections() {
        let input = TestInput::new(50_000, 1_500, 50_000, 1_560).unwrap();
        let report = build_report(input, &seeded(AnalysisMethod::Both)).unwrap();

        assert!(report.frequentist.is_some());
        let bayesian = report.bayesian.unwrap();
        assert_eq!(bayesian.seed, 11);
        assert_eq!(bayesian.samples, 2_000);
    }

    #[test]
    fn test_single_method() {
        let input = TestInput::new(1_000, 50, 1_000, 70).unwrap();

        let report = build_report(input, &seeded(AnalysisMethod::Frequentist)).unwrap();
        assert!(report.frequentist.is_some());
        assert!(report.bayesian.is_none());

        let report = build_report(input, &seeded(AnalysisMethod::Bayesian)).unwrap();
        assert!(report.frequentist.is_none());
        assert!(report.bayesian.is_some());
    }

    #[test]
    fn test_plots_and_samples_attached() {
        let input = TestInput::new(1_000, 50, 1_000, 70).unwrap();
        let settings = AnalysisSettings {
            plots: true,
            include_samples: true,
            ..seeded(AnalysisMethod::Both)
        };
        let report = build_report(input, &settings).unwrap();

        let plots = report.frequentist.unwrap().plots.unwrap();
        assert_eq!(plots.test_visualisation.null_curve.x.len(), 50);

        let bayesian = report.bayesian.unwrap();
        assert_eq!(bayesian.plots.unwrap().posterior_control.x.len(), 100);
        assert_eq!(bayesian.raw_samples.unwrap().control.len(), 2_000);
    }

    #[test]
    fn test_boundary_rate_skips_bayesian_in_both_mode() {
        let input = TestInput::new(100, 0, 100, 5).unwrap();

        let report = build_report(input, &seeded(AnalysisMethod::Both)).unwrap();
        assert!(report.frequentist.is_some());
        assert!(report.bayesian.is_none());

        let err = build_report(input, &seeded(AnalysisMethod::Bayesian)).unwrap_err();
        assert!(format!("{:#}", err).contains("strictly between 0 and 1"));
    }

    #[test]
    fn test_invalid_alpha_is_reported() {
        let input = TestInput::new(1_000, 50, 1_000, 70).unwrap();
        let settings = AnalysisSettings {
            frequentist: FrequentistConfig {
                alpha: 1.5,
                two_tailed: true,
            },
            ..seeded(AnalysisMethod::Frequentist)
        };

        let err = build_report(input, &settings).unwrap_err();
        assert!(format!("{:#}", err).contains("frequentist analysis failed"));
    }
}
