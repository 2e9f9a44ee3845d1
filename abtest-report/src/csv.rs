//! CSV Output
//!
//! Long-format plot series, one row per point: `plot,series,x,y`. Reports
//! without plots produce only the header.

use crate::report::{CurveSeries, Report};
use std::fmt::Write;

/// Generate CSV rows for every curve in the report
pub fn generate_csv_report(report: &Report) -> String {
    let mut output = String::from("plot,series,x,y\n");

    if let Some(plots) = report.frequentist.as_ref().and_then(|f| f.plots.as_ref()) {
        push_curve(
            &mut output,
            "test_visualisation",
            "null",
            &plots.test_visualisation.null_curve,
        );
        push_curve(&mut output, "power", "A", &plots.power.control_curve);
        push_curve(&mut output, "power", "B", &plots.power.variant_curve);
    }

    if let Some(plots) = report.bayesian.as_ref().and_then(|b| b.plots.as_ref()) {
        push_curve(&mut output, "posterior", "A", &plots.posterior_control);
        push_curve(&mut output, "posterior", "B", &plots.posterior_variant);
        push_curve(&mut output, "difference", "B-A", &plots.difference);
    }

    output
}

fn push_curve(output: &mut String, plot: &str, series: &str, curve: &CurveSeries) {
    for (x, y) in curve.x.iter().zip(&curve.y) {
        // Writing to a String never fails
        let _ = writeln!(output, "{},{},{},{}", plot, series, x, y);
    }
}
