//! Timing of one scoring run, reported by `explain`.
//!
//! Timings never feed back into the score; they exist for profiling and
//! for the CLI report.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct RunMetrics {
    /// Total elapsed time, validation to category.
    pub total: Duration,
    /// Keyword and pattern matching.
    pub matching: Duration,
    /// The five scoring rules, plus confidence.
    pub rules: Duration,
    /// Clamping, price adjustment and categorisation.
    pub post_processing: Duration,
}
