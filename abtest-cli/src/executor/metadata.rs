//! Report Metadata
//!
//! Stamps each report with the schema version, the tool version, the UTC
//! generation time and the analysis method that produced it.

use abtest_report::{AnalysisMethod, ReportMeta, SCHEMA_VERSION};
use chrono::Utc;

/// Build report metadata for a run of `method`
pub fn build_report_meta(method: AnalysisMethod) -> ReportMeta {
    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        method,
    }
}
