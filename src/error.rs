//! Error types for dictionary loading and per-menu scoring.

use std::path::PathBuf;

use thiserror::Error;

/// Loading or validating a dictionary source failed. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read dictionary source {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary source `{source_name}` is malformed")]
    Malformed {
        source_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("dictionary source `{source_name}` has an invalid pattern `{pattern}`")]
    InvalidPattern {
        source_name: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("dictionary source `{source_name}` has an invalid entry `{keyword}`: {reason}")]
    InvalidEntry { source_name: &'static str, keyword: String, reason: String },
}

/// Scoring a single menu failed. Never escapes [`KetoScorer::score`](crate::KetoScorer::score).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("menu name is empty")]
    EmptyName,
    #[error("menu text is {len} characters long (limit {max})")]
    TextTooLong { len: usize, max: usize },
    #[error("menu price {price} is negative")]
    NegativePrice { price: i64 },
    #[error("score became non-finite during {stage}")]
    NonFiniteScore { stage: &'static str },
    #[error("scoring panicked: {message}")]
    Panicked { message: String },
}
