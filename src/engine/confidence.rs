//! Self-assessed confidence of a score.
//!
//! ```text
//! no matches   -> 0.1
//! weighted     =  Σ(conf_i * |w_i|) / Σ|w_i|
//! count_factor =  min(1, n / 3)
//! confidence   =  min(0.95, weighted * 0.7 + count_factor * 0.3)
//! ```

use serde::Serialize;

use crate::KeywordMatch;

pub(crate) const NO_MATCH_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.95;
const WEIGHTED_SHARE: f64 = 0.7;
const COUNT_SHARE: f64 = 0.3;
const SATURATING_MATCH_COUNT: f64 = 3.0;

/// The parts the confidence value was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    pub weighted: f64,
    pub count_factor: f64,
    pub value: f64,
}

pub(crate) fn confidence(matches: &[KeywordMatch]) -> ConfidenceBreakdown {
    if matches.is_empty() {
        return ConfidenceBreakdown { weighted: 0.0, count_factor: 0.0, value: NO_MATCH_CONFIDENCE };
    }

    let total_weight: f64 = matches.iter().map(|m| m.weight.abs()).sum();
    let weighted = if total_weight > 0.0 {
        matches.iter().map(|m| m.confidence * m.weight.abs()).sum::<f64>() / total_weight
    } else {
        0.0
    };
    let count_factor = (matches.len() as f64 / SATURATING_MATCH_COUNT).min(1.0);
    let value = (weighted * WEIGHTED_SHARE + count_factor * COUNT_SHARE).min(MAX_CONFIDENCE);

    ConfidenceBreakdown { weighted, count_factor, value }
}
