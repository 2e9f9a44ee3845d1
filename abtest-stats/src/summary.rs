//! Posterior Summaries
//!
//! Summarises a sequence of simulated draws: central tendency, spread and an
//! equal-tailed credible interval read off the sorted draws.

/// Equal-tailed interval of a simulated distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CredibleInterval {
    pub lower: f64,
    pub upper: f64,
    /// Probability mass inside the interval (e.g. 0.95)
    pub level: f64,
}

impl CredibleInterval {
    /// Whether `value` lies inside the interval
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// True when zero lies outside the interval, i.e. the variants credibly differ
    pub fn excludes_zero(&self) -> bool {
        !self.contains(0.0)
    }

    /// Interval width
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Summary of a set of posterior draws
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub credible_interval: CredibleInterval,
    pub sample_count: usize,
}

/// Summarise draws with a credible interval at `level` (0 < level < 1)
pub fn summarize_draws(draws: &[f64], level: f64) -> PosteriorSummary {
    if draws.is_empty() {
        return PosteriorSummary {
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            credible_interval: CredibleInterval {
                lower: 0.0,
                upper: 0.0,
                level,
            },
            sample_count: 0,
        };
    }

    let mut sorted = draws.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std_dev = if n < 2 {
        0.0
    } else {
        (sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    };

    let tail = (1.0 - level) / 2.0;

    PosteriorSummary {
        mean,
        median: percentile_of_sorted(&sorted, 0.5),
        std_dev,
        min: sorted[0],
        max: sorted[n - 1],
        credible_interval: CredibleInterval {
            lower: percentile_of_sorted(&sorted, tail),
            upper: percentile_of_sorted(&sorted, 1.0 - tail),
            level,
        },
        sample_count: n,
    }
}

/// Quantile `q` (0..=1) of sorted, non-empty draws, interpolating between ranks
fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let draws = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        let summary = summarize_draws(&draws, 0.5);

        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert!((summary.median - 3.0).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.sample_count, 5);
        // sample std dev of 1..=5
        assert!((summary.std_dev - 2.5f64.sqrt()).abs() < 1e-12);
        assert!((summary.credible_interval.lower - 2.0).abs() < 1e-12);
        assert!((summary.credible_interval.upper - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_credible_interval_of_uniform_grid() {
        let draws: Vec<f64> = (0..=1000).map(|i| i as f64 / 1000.0).collect();
        let summary = summarize_draws(&draws, 0.95);

        assert!((summary.credible_interval.lower - 0.025).abs() < 1e-9);
        assert!((summary.credible_interval.upper - 0.975).abs() < 1e-9);
        assert!((summary.credible_interval.width() - 0.95).abs() < 1e-9);
        assert_eq!(summary.credible_interval.level, 0.95);
    }

    #[test]
    fn test_excludes_zero() {
        let straddles = CredibleInterval {
            lower: -0.1,
            upper: 0.2,
            level: 0.95,
        };
        let positive = CredibleInterval {
            lower: 0.01,
            upper: 0.2,
            level: 0.95,
        };
        assert!(!straddles.excludes_zero());
        assert!(positive.excludes_zero());
    }

    #[test]
    fn test_quantile_interpolates() {
        assert!((percentile_of_sorted(&[10.0, 20.0], 0.25) - 12.5).abs() < 1e-12);
        assert!((percentile_of_sorted(&[42.0], 0.9) - 42.0).abs() < f64::EPSILON);
        assert_eq!(percentile_of_sorted(&[1.0, 2.0, 3.0], 1.5), 3.0);
    }

    #[test]
    fn test_empty_draws() {
        let summary = summarize_draws(&[], 0.95);
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.mean, 0.0);
    }
}
