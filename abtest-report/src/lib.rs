#![warn(missing_docs)]
//! abtest Report - Serializable Results
//!
//! Output formats:
//! - JSON (machine-readable, full schema)
//! - CSV (plot series for spreadsheets and charting tools)
//! - Human (terminal tables, rendered by the CLI)

mod csv;
mod json;
mod report;

pub use csv::generate_csv_report;
pub use json::{generate_json_report, parse_json_report};
pub use report::{
    AnalysisMethod, BayesianPlots, BayesianReport, CurveSeries, DifferenceSummary,
    FrequentistPlots, FrequentistReport, PosteriorParams, PowerSeries, RawSamples, RegionSeries,
    Report, ReportMeta, SCHEMA_VERSION, TestVisualisationSeries,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// CSV plot series
    Csv,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Format a fraction as a percentage with two decimals (e.g. `0.0312` → `3.12%`)
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
