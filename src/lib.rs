//! Rule-based keto-friendliness scoring for restaurant menu items.
//!
//! A menu's name and description are matched against a read-only
//! [`KeywordDictionary`], five ordered scoring rules turn the matches into a
//! raw score, and post-processing produces the final [`KetoScore`] together
//! with a confidence value, a [`Category`] and the full reason trail.
//!
//! ```
//! use ketoscore::{KetoScorer, Menu};
//!
//! let scorer = KetoScorer::builtin().expect("builtin dictionary loads");
//! let score = scorer.score(&Menu::new("연어 스테이크 샐러드"));
//! assert!(score.final_score > 0.0);
//! ```

extern crate self as ketoscore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[macro_use]
mod macros;
mod api;
mod dictionary;
mod engine;
mod error;
mod rules;

pub use api::{Context, KetoScorer, MAX_TEXT_CHARS, Options, RuleTrace, ScoreExplanation};
pub use dictionary::{
    DICTIONARY_DIR_ENV, DictionarySource, DictionarySources, KeywordDictionary, KeywordEntry, PatternGroup, PatternKind,
    builtin_dictionary,
};
pub use engine::{
    ConfidenceBreakdown, DetectionPath, KeywordMatcher, NegationContext, RunMetrics, SubstitutionContext,
    SubstitutionDetector,
};
pub use error::{ConfigError, ScoringError};

// --- Matches -----------------------------------------------------------------

/// Closed set of keyword categories a match can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    HighCarb,
    KetoFriendly,
    Substitution,
    Negation,
    MenuType,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::HighCarb => "high_carb",
            MatchKind::KetoFriendly => "keto_friendly",
            MatchKind::Substitution => "substitution",
            MatchKind::Negation => "negation",
            MatchKind::MenuType => "menu_type",
        }
    }

    fn flag(self) -> KindSet {
        match self {
            MatchKind::HighCarb => KindSet::HIGH_CARB,
            MatchKind::KetoFriendly => KindSet::KETO_FRIENDLY,
            MatchKind::Substitution => KindSet::SUBSTITUTION,
            MatchKind::Negation => KindSet::NEGATION,
            MatchKind::MenuType => KindSet::MENU_TYPE,
        }
    }
}

bitflags::bitflags! {
    /// Which match kinds occur in a match list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        const HIGH_CARB     = 1 << 0;
        const KETO_FRIENDLY = 1 << 1;
        const SUBSTITUTION  = 1 << 2;
        const NEGATION      = 1 << 3;
        const MENU_TYPE     = 1 << 4;
    }
}

impl KindSet {
    pub fn of(matches: &[KeywordMatch]) -> Self {
        matches.iter().fold(KindSet::empty(), |set, m| set | m.kind.flag())
    }

    pub fn has(self, kind: MatchKind) -> bool {
        self.contains(kind.flag())
    }
}

/// One keyword hit in the lower-cased menu text.
///
/// `position` is the character offset of the first occurrence; `context` is
/// the text within ten characters either side of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub kind: MatchKind,
    pub weight: f64,
    pub confidence: f64,
    pub position: usize,
    pub context: String,
}

// --- Score output --------------------------------------------------------------

/// One entry of the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReason {
    pub rule_id: String,
    pub keyword: String,
    pub impact: f64,
    pub explanation: String,
}

impl ScoreReason {
    pub(crate) fn new(
        rule_id: &str,
        keyword: impl Into<String>,
        impact: f64,
        explanation: impl Into<String>,
    ) -> Self {
        Self { rule_id: rule_id.to_string(), keyword: keyword.into(), impact, explanation: explanation.into() }
    }
}

/// Recommendation band derived from `(final_score, confidence)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Recommended,
    Moderate,
    Caution,
    Avoid,
}

impl Category {
    /// Below this confidence the engine does not commit to a band.
    pub const MIN_CONFIDENCE: f64 = 0.3;

    /// Band for a final score at a given confidence.
    ///
    /// ```text
    /// confidence < 0.3           -> Moderate
    /// score * confidence >= 40   -> Recommended
    ///                    >= 15   -> Moderate
    ///                    >= -15  -> Caution
    ///                    else    -> Avoid
    /// ```
    pub fn classify(final_score: f64, confidence: f64) -> Self {
        if confidence < Self::MIN_CONFIDENCE {
            return Category::Moderate;
        }
        let adjusted = final_score * confidence;
        if adjusted >= 40.0 {
            Category::Recommended
        } else if adjusted >= 15.0 {
            Category::Moderate
        } else if adjusted >= -15.0 {
            Category::Caution
        } else {
            Category::Avoid
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Recommended => "recommended",
            Category::Moderate => "moderate",
            Category::Caution => "caution",
            Category::Avoid => "avoid",
        }
    }

    /// Ordering from most to least favourable; lower is better.
    pub fn rank(self) -> u8 {
        match self {
            Category::Recommended => 0,
            Category::Moderate => 1,
            Category::Caution => 2,
            Category::Avoid => 3,
        }
    }
}

/// Final result of scoring one menu item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KetoScore {
    pub raw_score: f64,
    pub final_score: f64,
    pub confidence: f64,
    pub category: Category,
    pub reasons: Vec<ScoreReason>,
    pub detected_keywords: Vec<String>,
    pub applied_rules: Vec<String>,
    pub calculated_at: DateTime<Utc>,
}

impl KetoScore {
    pub(crate) const ERROR_RULE: &'static str = "error_handling";

    /// Score returned in place of a failed computation.
    pub(crate) fn fallback(err: &ScoringError, calculated_at: DateTime<Utc>) -> Self {
        Self {
            raw_score: 0.0,
            final_score: 0.0,
            confidence: 0.1,
            category: Category::Avoid,
            reasons: vec![ScoreReason::new(Self::ERROR_RULE, "error", 0.0, err.to_string())],
            detected_keywords: Vec::new(),
            applied_rules: vec![Self::ERROR_RULE.to_string()],
            calculated_at,
        }
    }
}

// --- Input -------------------------------------------------------------------

/// A menu item as handed over by the caller.
///
/// Only `name`, `description` and `price` are read; `restaurant_id` is passed
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub restaurant_id: Option<String>,
}

impl Menu {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    /// Lower-cased `name + " " + description`, the text every matcher sees.
    pub(crate) fn search_text(&self) -> String {
        let description = self.description.as_deref().unwrap_or("");
        format!("{} {}", self.name, description).trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests;
