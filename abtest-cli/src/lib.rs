#![warn(missing_docs)]
//! abtest CLI Library
//!
//! Command-line front end for the A/B test engines. Use `abtest::run()` (or
//! `abtest_cli::run()`) in a main function to get the full CLI.
//!
//! # Example
//!
//! ```text
//! abtest both --visitors-a 50000 --conversions-a 1500 \
//!             --visitors-b 50000 --conversions-b 1560 --seed 42
//! abtest frequentist --one-tailed --alpha 0.1 --format json
//! abtest bayesian --samples 20000 --plots --format csv -o plots.csv
//! ```

mod config;
mod executor;

pub use config::*;
pub use executor::{AnalysisSettings, build_report, build_report_meta, format_human_output};

use abtest_report::{AnalysisMethod, OutputFormat, generate_csv_report, generate_json_report};
use abtest_stats::{BayesianConfig, FrequentistConfig, TestInput};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Visitor and conversion counts used when none are given on the command line
const DEFAULT_INPUT: (u64, u64, u64, u64) = (50_000, 1_500, 50_000, 1_560);

/// abtest CLI arguments
#[derive(Parser, Debug)]
#[command(name = "abtest")]
#[command(
    author,
    version,
    about = "abtest - A/B test calculator: Z-test with power analysis and Bayesian comparison"
)]
pub struct Cli {
    /// Analysis to run (Bayesian, Frequentist, Both); defaults to Both
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Visitors in variant A (control)
    #[arg(long, global = true)]
    pub visitors_a: Option<u64>,

    /// Conversions in variant A (control)
    #[arg(long, global = true)]
    pub conversions_a: Option<u64>,

    /// Visitors in variant B
    #[arg(long, global = true)]
    pub visitors_b: Option<u64>,

    /// Conversions in variant B
    #[arg(long, global = true)]
    pub conversions_b: Option<u64>,

    /// Type I error rate (significance level = 1 - alpha)
    #[arg(long, global = true)]
    pub alpha: Option<f64>,

    /// Run a one-tailed test in the direction of the observed difference
    #[arg(long, global = true)]
    pub one_tailed: bool,

    /// Run a two-tailed test, overriding `two_tailed = false` in abtest.toml
    #[arg(long, global = true)]
    pub two_tailed: bool,

    /// Draws per posterior distribution
    #[arg(long, short = 'n', global = true)]
    pub samples: Option<usize>,

    /// Seed for reproducible posterior simulation
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Credible level for the simulated difference
    #[arg(long, global = true)]
    pub credible_level: Option<f64>,

    /// Points per normal curve in the frequentist plots
    #[arg(long, global = true)]
    pub points: Option<usize>,

    /// Histogram bins for the posterior density plots
    #[arg(long, global = true)]
    pub bins: Option<usize>,

    /// Include plot coordinates in the report
    #[arg(long, global = true)]
    pub plots: bool,

    /// Embed raw posterior draws in the report
    #[arg(long, global = true)]
    pub include_samples: bool,

    /// Output format: human, json, csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file (discovered from abtest.toml if not specified)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Bayesian comparison of Beta posteriors
    Bayesian,
    /// Two-proportion Z-test with power analysis
    Frequentist,
    /// Run both analyses (default)
    Both,
    /// Write a default abtest.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the abtest CLI with the process arguments.
/// This is the main entry point for the `abtest` binary.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the abtest CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if let Some(Commands::Init { force }) = cli.command {
        return write_default_config(force);
    }

    let config = load_config(&cli)?;
    let format = resolve_format(&cli, &config)?;
    let settings = resolve_settings(&cli, &config)?;
    let input = resolve_input(&cli)?;

    let report = build_report(input, &settings)?;

    // Generate output
    let output = match format {
        OutputFormat::Json => {
            generate_json_report(&report).context("failed to serialize JSON report")?
        }
        OutputFormat::Csv => generate_csv_report(&report),
        OutputFormat::Human => format_human_output(&report),
    };

    // Write output
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    Ok(())
}

/// Initialize logging on stderr; `RUST_LOG` overrides the default filter
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "abtest=debug" } else { "abtest=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Already initialized when called more than once in-process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Explicit `--config` path, else discovered abtest.toml, else defaults
fn load_config(cli: &Cli) -> anyhow::Result<AbTestConfig> {
    if let Some(path) = &cli.config {
        let config = AbTestConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        return Ok(config);
    }

    match AbTestConfig::discover().context("failed to load discovered abtest.toml")? {
        Some((path, config)) => {
            info!(path = %path.display(), "discovered configuration");
            Ok(config)
        }
        None => Ok(AbTestConfig::default()),
    }
}

fn write_default_config(force: bool) -> anyhow::Result<()> {
    let path = std::env::current_dir()?.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    std::fs::write(&path, AbTestConfig::default_toml())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Output format: CLI flag, then config file
pub fn resolve_format(cli: &Cli, config: &AbTestConfig) -> anyhow::Result<OutputFormat> {
    let raw = cli.format.as_deref().unwrap_or(config.output.format.as_str());
    raw.parse::<OutputFormat>().map_err(|e| anyhow::anyhow!(e))
}

/// Layer settings: built-in defaults → abtest.toml → CLI flags
pub fn resolve_settings(cli: &Cli, config: &AbTestConfig) -> anyhow::Result<AnalysisSettings> {
    let method = match cli.command {
        Some(Commands::Bayesian) => AnalysisMethod::Bayesian,
        Some(Commands::Frequentist) => AnalysisMethod::Frequentist,
        Some(Commands::Both) | Some(Commands::Init { .. }) | None => AnalysisMethod::Both,
    };

    let mut frequentist = FrequentistConfig::from(&config.frequentist);
    if let Some(alpha) = cli.alpha {
        frequentist.alpha = alpha;
    }
    anyhow::ensure!(
        !(cli.one_tailed && cli.two_tailed),
        "--one-tailed and --two-tailed cannot be used together"
    );
    if cli.one_tailed {
        frequentist.two_tailed = false;
    } else if cli.two_tailed {
        frequentist.two_tailed = true;
    }

    let mut bayesian = BayesianConfig::from(&config.bayesian);
    if let Some(samples) = cli.samples {
        bayesian.samples = samples;
    }
    if cli.seed.is_some() {
        bayesian.seed = cli.seed;
    }
    if let Some(level) = cli.credible_level {
        bayesian.credible_level = level;
    }
    if let Some(bins) = cli.bins {
        bayesian.density_bins = bins;
    }

    let curve_points = cli.points.unwrap_or(config.output.curve_points);

    anyhow::ensure!(
        curve_points >= 2,
        "curve points must be at least 2 (got {})",
        curve_points
    );
    anyhow::ensure!(
        bayesian.density_bins >= 1,
        "density bins must be at least 1 (got {})",
        bayesian.density_bins
    );

    Ok(AnalysisSettings {
        method,
        frequentist,
        bayesian,
        curve_points,
        plots: cli.plots || config.output.plots,
        include_samples: cli.include_samples || config.output.include_samples,
    })
}

/// Test counts from the CLI: all four flags, or none for the built-in sample data
pub fn resolve_input(cli: &Cli) -> anyhow::Result<TestInput> {
    let counts = [
        ("--visitors-a", cli.visitors_a),
        ("--conversions-a", cli.conversions_a),
        ("--visitors-b", cli.visitors_b),
        ("--conversions-b", cli.conversions_b),
    ];

    let (va, ca, vb, cb) = match counts.map(|(_, value)| value) {
        [Some(va), Some(ca), Some(vb), Some(cb)] => (va, ca, vb, cb),
        [None, None, None, None] => DEFAULT_INPUT,
        _ => {
            let missing: Vec<&str> = counts
                .iter()
                .filter(|(_, value)| value.is_none())
                .map(|(flag, _)| *flag)
                .collect();
            anyhow::bail!(
                "test counts are incomplete: missing {} (pass all four counts or none)",
                missing.join(", ")
            );
        }
    };

    let input = TestInput::new(va, ca, vb, cb).context("invalid test data")?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("abtest").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_command_is_both() {
        let cli = parse(&[]);
        let settings = resolve_settings(&cli, &AbTestConfig::default()).unwrap();
        assert_eq!(settings.method, AnalysisMethod::Both);
        assert!(settings.frequentist.two_tailed);
        assert!(!settings.plots);
    }

    #[test]
    fn test_subcommand_and_global_flags() {
        let cli = parse(&[
            "frequentist",
            "--visitors-a",
            "1000",
            "--conversions-a",
            "30",
            "--visitors-b",
            "1200",
            "--conversions-b",
            "45",
            "--one-tailed",
            "--alpha",
            "0.1",
        ]);
        assert_eq!(cli.command, Some(Commands::Frequentist));

        let settings = resolve_settings(&cli, &AbTestConfig::default()).unwrap();
        assert_eq!(settings.method, AnalysisMethod::Frequentist);
        assert!(!settings.frequentist.two_tailed);
        assert!((settings.frequentist.alpha - 0.1).abs() < f64::EPSILON);

        let input = resolve_input(&cli).unwrap();
        assert_eq!(input.visitors(abtest_stats::Variant::A), 1_000);
        assert_eq!(input.visitors(abtest_stats::Variant::B), 1_200);
        assert_eq!(input.conversions(abtest_stats::Variant::B), 45);
    }

    #[test]
    fn test_no_counts_uses_sample_data() {
        let input = resolve_input(&parse(&["both"])).unwrap();
        assert_eq!(input.visitors(abtest_stats::Variant::A), 50_000);
        assert_eq!(input.conversions(abtest_stats::Variant::B), 1_560);
    }

    #[test]
    fn test_partial_counts_rejected() {
        let cli = parse(&[
            "--visitors-a",
            "2000",
            "--conversions-a",
            "100",
            "--visitors-b",
            "2000",
        ]);
        let err = resolve_input(&cli).unwrap_err().to_string();
        assert!(err.contains("--conversions-b"));
        assert!(!err.contains("--visitors-b"));

        let cli = parse(&["frequentist", "--conversions-b", "12"]);
        assert!(resolve_input(&cli).is_err());
    }

    #[test]
    fn test_two_tailed_flag_overrides_config() {
        let config: AbTestConfig = toml::from_str(
            r#"
            [frequentist]
            two_tailed = false
        "#,
        )
        .unwrap();

        let settings = resolve_settings(&parse(&[]), &config).unwrap();
        assert!(!settings.frequentist.two_tailed);

        let settings = resolve_settings(&parse(&["--two-tailed"]), &config).unwrap();
        assert!(settings.frequentist.two_tailed);

        let cli = parse(&["--one-tailed", "--two-tailed"]);
        assert!(resolve_settings(&cli, &config).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config: AbTestConfig = toml::from_str(
            r#"
            [frequentist]
            alpha = 0.1

            [bayesian]
            samples = 500
            seed = 1

            [output]
            format = "json"
            plots = true
        "#,
        )
        .unwrap();

        let cli = parse(&["bayesian", "--seed", "9", "--format", "csv"]);
        let settings = resolve_settings(&cli, &config).unwrap();

        // From the file
        assert!((settings.frequentist.alpha - 0.1).abs() < f64::EPSILON);
        assert_eq!(settings.bayesian.samples, 500);
        assert!(settings.plots);
        // From the flags
        assert_eq!(settings.bayesian.seed, Some(9));
        assert_eq!(resolve_format(&cli, &config).unwrap(), OutputFormat::Csv);

        let cli = parse(&[]);
        assert_eq!(resolve_format(&cli, &config).unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let cli = parse(&["--points", "1"]);
        assert!(resolve_settings(&cli, &AbTestConfig::default()).is_err());

        let cli = parse(&["--format", "xml"]);
        assert!(resolve_format(&cli, &AbTestConfig::default()).is_err());
    }

    #[test]
    fn test_invalid_input_rejected() {
        let cli = parse(&[
            "--visitors-a",
            "10",
            "--conversions-a",
            "11",
            "--visitors-b",
            "10",
            "--conversions-b",
            "1",
        ]);
        let err = resolve_input(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid test data"));
    }

    #[test]
    fn test_init_subcommand_parses() {
        let cli = parse(&["init", "--force"]);
        assert_eq!(cli.command, Some(Commands::Init { force: true }));
    }
}
