//! Correlation and end-to-end analysis for debrisscan.
//!
//! This crate ties the extractor and crawler together into the full
//! debris-page → map-crawl → correlation workflow ([`pipeline::analyze`]),
//! and owns the value-matching algorithm ([`correlate`]).

pub mod correlate;
pub mod pipeline;

pub use correlate::{Assignment, DEFAULT_TOLERANCE, Resolution, correlate};
pub use pipeline::{
    AnalysisReport, AnalyzeConfig, CandidateSummary, PageSource, ProgressReporter, SilentProgress,
    analyze,
};
