//! Configuration loading from abtest.toml
//!
//! Analysis defaults can be kept in an `abtest.toml` file next to the data.
//! The configuration is automatically discovered by walking up from the current directory.
//! Command-line flags always win over values from the file.

use abtest_stats::{
    BayesianConfig, DEFAULT_ALPHA, DEFAULT_CREDIBLE_LEVEL, DEFAULT_CURVE_POINTS,
    DEFAULT_DENSITY_BINS, DEFAULT_POSTERIOR_SAMPLES, FrequentistConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up by [`AbTestConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "abtest.toml";

/// abtest configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AbTestConfig {
    /// Z-test settings
    #[serde(default)]
    pub frequentist: FrequentistSection,
    /// Posterior simulation settings
    #[serde(default)]
    pub bayesian: BayesianSection,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[frequentist]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequentistSection {
    /// Type I error rate (e.g., 0.05)
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Two-tailed test; set to false for a one-tailed test
    #[serde(default = "default_two_tailed")]
    pub two_tailed: bool,
}

impl Default for FrequentistSection {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            two_tailed: default_two_tailed(),
        }
    }
}

impl From<&FrequentistSection> for FrequentistConfig {
    fn from(section: &FrequentistSection) -> Self {
        FrequentistConfig {
            alpha: section.alpha,
            two_tailed: section.two_tailed,
        }
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}
fn default_two_tailed() -> bool {
    true
}

/// `[bayesian]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianSection {
    /// Draws per posterior
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
    /// Mass of the credible interval for the difference
    #[serde(default = "default_credible_level")]
    pub credible_level: f64,
    /// Histogram bins for posterior density plots
    #[serde(default = "default_density_bins")]
    pub density_bins: usize,
}

impl Default for BayesianSection {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            seed: None,
            credible_level: default_credible_level(),
            density_bins: default_density_bins(),
        }
    }
}

impl From<&BayesianSection> for BayesianConfig {
    fn from(section: &BayesianSection) -> Self {
        BayesianConfig {
            samples: section.samples,
            seed: section.seed,
            credible_level: section.credible_level,
            density_bins: section.density_bins,
        }
    }
}

fn default_samples() -> usize {
    DEFAULT_POSTERIOR_SAMPLES
}
fn default_credible_level() -> f64 {
    DEFAULT_CREDIBLE_LEVEL
}
fn default_density_bins() -> usize {
    DEFAULT_DENSITY_BINS
}

/// `[output]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Grid size of the normal curves in the frequentist plots
    #[serde(default = "default_curve_points")]
    pub curve_points: usize,
    /// Include plot coordinates in the report
    #[serde(default)]
    pub plots: bool,
    /// Embed raw posterior draws in JSON reports
    #[serde(default)]
    pub include_samples: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            curve_points: default_curve_points(),
            plots: false,
            include_samples: false,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_curve_points() -> usize {
    DEFAULT_CURVE_POINTS
}

impl AbTestConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Find `abtest.toml` in `start` or any of its ancestors
    pub fn find(start: impl AsRef<Path>) -> Option<PathBuf> {
        let mut dir = start.as_ref().to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Discover the configuration by walking up from the current directory
    ///
    /// Returns `Ok(None)` when no file exists; a file that fails to parse is an error.
    pub fn discover() -> anyhow::Result<Option<(PathBuf, Self)>> {
        let cwd = std::env::current_dir()?;
        match Self::find(cwd) {
            Some(path) => {
                let config = Self::load(&path)?;
                Ok(Some((path, config)))
            }
            None => Ok(None),
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# abtest configuration
# Command-line flags override every value below.

[frequentist]
# Type I error rate (significance level = 1 - alpha)
alpha = 0.05
# Two-tailed test; false tests one direction only
two_tailed = true

[bayesian]
# Draws per posterior distribution
samples = 100000
# Fixed seed for reproducible simulations (uncomment to enable)
# seed = 42
# Credible interval for the simulated difference
credible_level = 0.95
# Histogram bins for the posterior density plots
density_bins = 100

[output]
# Default output format: human, json, csv
format = "human"
# Points per normal curve in the frequentist plots
curve_points = 1000
# Include plot coordinates in the report
plots = false
# Embed raw posterior draws in JSON reports
include_samples = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AbTestConfig::default();
        assert!((config.frequentist.alpha - 0.05).abs() < f64::EPSILON);
        assert!(config.frequentist.two_tailed);
        assert_eq!(config.bayesian.samples, 100_000);
        assert!(config.bayesian.seed.is_none());
        assert_eq!(config.output.format, "human");
        assert!(!config.output.plots);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [frequentist]
            alpha = 0.1
            two_tailed = false

            [bayesian]
            seed = 7
        "#;

        let config: AbTestConfig = toml::from_str(toml_str).unwrap();
        assert!((config.frequentist.alpha - 0.1).abs() < f64::EPSILON);
        assert!(!config.frequentist.two_tailed);
        assert_eq!(config.bayesian.seed, Some(7));
        // Defaults should still apply
        assert_eq!(config.bayesian.samples, 100_000);
        assert_eq!(config.output.curve_points, 1_000);
    }

    #[test]
    fn test_section_conversions() {
        let config: AbTestConfig = toml::from_str("[bayesian]\nsamples = 500\nseed = 3").unwrap();

        let bayesian = BayesianConfig::from(&config.bayesian);
        assert_eq!(bayesian.samples, 500);
        assert_eq!(bayesian.seed, Some(3));

        let frequentist = FrequentistConfig::from(&config.frequentist);
        assert_eq!(frequentist, FrequentistConfig::default());
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = AbTestConfig::default_toml();
        let config: AbTestConfig = toml::from_str(&default_toml).unwrap();
        assert!((config.frequentist.alpha - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.bayesian.density_bins, 100);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_find_walks_up() {
        let root = std::env::temp_dir().join(format!("abtest-config-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(CONFIG_FILE_NAME), AbTestConfig::default_toml()).unwrap();

        let found = AbTestConfig::find(&nested).unwrap();
        assert_eq!(found, root.join(CONFIG_FILE_NAME));
        assert!(AbTestConfig::load(&found).is_ok());

        std::fs::remove_dir_all(&root).unwrap();
    }
}
