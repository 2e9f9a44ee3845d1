//! Output Formatting
//!
//! Human-readable output formatting for analysis reports.
//!
//! Generates terminal-friendly output with:
//! - A results table per method (visitors, conversions, rate, uplift)
//! - The significance verdict and its confidence / Type I / Type II narrative
//! - Posterior probabilities and the credible range of the difference

use abtest_report::{BayesianReport, FrequentistReport, Report, format_percent};
use abtest_stats::{Direction, TestInput, Variant, Verdict};

const RULE_WIDTH: usize = 60;

/// Commonly accepted minimum power for a well-sized test
const POWER_THRESHOLD: f64 = 0.8;

/// Format a report for human-readable terminal display
///
/// # Arguments
/// * `report` - Complete analysis report
///
/// # Returns
/// Formatted string suitable for terminal output
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("A/B Test Results\n");
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push_str("\n\n");

    if let Some(frequentist) = &report.frequentist {
        format_frequentist(&mut output, &report.input, frequentist);
    }

    if let Some(bayesian) = &report.bayesian {
        format_bayesian(&mut output, &report.input, bayesian);
    }

    if report.frequentist.is_none() && report.bayesian.is_none() {
        output.push_str("No analysis could be run for this input.\n");
    }

    output
}

fn format_frequentist(output: &mut String, input: &TestInput, f: &FrequentistReport) {
    let tails = if f.tail_direction.is_two_tailed() {
        "two-tailed"
    } else {
        "one-tailed"
    };
    output.push_str(&format!(
        "Frequentist ({} Z-test, {} confidence)\n",
        tails,
        whole_percent(f.confidence)
    ));
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');

    match f.verdict {
        Verdict::Significant { direction } => {
            let word = match direction {
                Direction::Higher => "higher",
                Direction::Lower => "lower",
            };
            output.push_str("  Significant\n");
            if let Some(rel) = f.relative_difference {
                output.push_str(&format!(
                    "  B's conversion rate is {} {} than A's.\n",
                    format_percent(rel.abs()),
                    word
                ));
            } else {
                output.push_str(&format!("  B's conversion rate is {} than A's.\n", word));
            }
        }
        Verdict::NotSignificant => output.push_str("  Not significant\n"),
    }
    output.push('\n');

    output.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>10} {:>10} {:>8} {:>9} {:>9}\n",
        "Variant", "Visitors", "Conversions", "Rate", "Uplift", "Power", "Z-score", "P-value"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(RULE_WIDTH + 24)));
    output.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>10}\n",
        "A",
        format_count(input.visitors(Variant::A)),
        format_count(input.conversions(Variant::A)),
        format_percent(f.control_cr)
    ));
    output.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>10} {:>10} {:>8.4} {:>9.4} {:>9.4}\n",
        "B",
        format_count(input.visitors(Variant::B)),
        format_count(input.conversions(Variant::B)),
        format_percent(f.variant_cr),
        optional_percent(f.relative_difference),
        f.power,
        f.z_score,
        f.p_value
    ));
    output.push('\n');

    if f.significant {
        output.push_str(&format!(
            "  You can be {} confident the result is real and caused by the change.\n",
            whole_percent(f.confidence)
        ));
        output.push_str(&format!(
            "  There is a {} chance the result is a false positive (Type I error).\n",
            whole_percent(f.alpha)
        ));
        output.push_str(&format!(
            "  The observed difference falls inside the shaded {} of the null distribution.\n",
            whole_percent(f.alpha)
        ));
    } else {
        output.push_str(&format!(
            "  There is not enough evidence of a {} difference in conversion rate between A and B.\n",
            optional_percent(f.relative_difference)
        ));
        output.push_str(
            "  Collect more data for a more precise test, or conclude it as inconclusive.\n",
        );
        if let Some(lift) = f.minimum_detectable_lift {
            output.push_str(&format!(
                "  A difference of more than {} is needed for significance.\n",
                format_percent(lift)
            ));
        }
    }
    output.push('\n');

    output.push_str(&format!("  Statistical power: {}", format_percent(f.power)));
    if f.power < POWER_THRESHOLD {
        output.push_str(&format!(
            " (below the usual {} threshold)",
            whole_percent(POWER_THRESHOLD)
        ));
    }
    output.push('\n');
    output.push_str(&format!(
        "  Type II error risk: 1 - {} = {}\n",
        format_percent(f.power),
        format_percent(f.type_ii_error)
    ));
    output.push('\n');
}

fn format_bayesian(output: &mut String, input: &TestInput, b: &BayesianReport) {
    output.push_str(&format!(
        "Bayesian (Beta posteriors, {} draws, seed {})\n",
        format_count(b.samples as u64),
        b.seed
    ));
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');

    output.push_str(&format!(
        "  There is a {} chance that B outperforms A.\n\n",
        format_percent(b.prob_b)
    ));

    output.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>10} {:>10} {:>16}\n",
        "Variant", "Visitors", "Conversions", "Rate", "Uplift", "P(being better)"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(RULE_WIDTH + 13)));
    output.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>10} {:>10} {:>16}\n",
        "A",
        format_count(input.visitors(Variant::A)),
        format_count(input.conversions(Variant::A)),
        format_percent(b.control_cr),
        "",
        format_percent(b.prob_a)
    ));
    output.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>10} {:>10} {:>16}\n",
        "B",
        format_count(input.visitors(Variant::B)),
        format_count(input.conversions(Variant::B)),
        format_percent(b.variant_cr),
        format_percent(b.relative_difference),
        format_percent(b.prob_b)
    ));
    output.push('\n');

    let d = &b.difference;
    output.push_str(&format!(
        "  Simulated difference B - A: mean {}, {} credible range [{}, {}]\n",
        format_percent(d.mean),
        whole_percent(d.credible_level),
        format_percent(d.credible_lower),
        format_percent(d.credible_upper)
    ));
    if d.excludes_zero {
        output.push_str("  The credible range excludes zero.\n");
    } else {
        output.push_str("  The credible range includes zero; more data will narrow it.\n");
    }
    output.push('\n');
}

/// Integer with thousands separators (e.g. `50000` → `50,000`)
fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn whole_percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

fn optional_percent(value: Option<f64>) -> String {
    value.map(format_percent).unwrap_or_else(|| "n/a".to_string())
}
