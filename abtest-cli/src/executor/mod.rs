//! Analysis Executor
//!
//! Turns a validated test input into a report and renders it for humans.
//!
//! ## Pipeline Overview
//!
//! ```text
//! TestInput + AnalysisSettings
//!       │
//!       ▼
//! ┌─────────────┐
//! │  analysis   │  Run Z-test and/or posterior simulation
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  metadata   │  Stamp version, time and method
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`analysis`] - Engine execution and report assembly
//! - [`metadata`] - Report metadata
//! - [`formatting`] - Human-readable output formatting

mod analysis;
mod formatting;
mod metadata;

// Re-export public API
pub use analysis::{AnalysisSettings, build_report};
pub use formatting::format_human_output;
pub use metadata::build_report_meta;
