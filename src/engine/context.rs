//! Per-call scoring state threaded through the rules.

use super::substitution::SubstitutionDetector;
use crate::{KeywordMatch, KindSet, MatchKind, ScoreReason};

/// Running state for one scoring call. Never shared between calls.
#[derive(Debug, Clone)]
pub(crate) struct RuleContext<'a> {
    /// Lower-cased `name + description`.
    pub text: &'a str,
    pub matches: &'a [KeywordMatch],
    /// Kinds present in `matches`.
    pub kinds: KindSet,
    pub detector: &'a SubstitutionDetector,
    pub current_score: f64,
    pub applied_rules: Vec<&'static str>,
    pub reasons: Vec<ScoreReason>,
}

impl<'a> RuleContext<'a> {
    pub fn new(text: &'a str, matches: &'a [KeywordMatch], detector: &'a SubstitutionDetector) -> Self {
        Self {
            text,
            matches,
            kinds: KindSet::of(matches),
            detector,
            current_score: 0.0,
            applied_rules: Vec::new(),
            reasons: Vec::new(),
        }
    }

    /// Same inputs, zero score, empty trail.
    pub fn fresh(&self) -> Self {
        Self::new(self.text, self.matches, self.detector)
    }

    /// Add `impact` to the score and record why.
    pub fn apply(&mut self, rule_id: &str, keyword: impl Into<String>, impact: f64, explanation: impl Into<String>) {
        self.current_score += impact;
        self.reasons.push(ScoreReason::new(rule_id, keyword, impact, explanation));
    }

    /// Matches of `kind` whose confidence passes `min_confidence`.
    pub fn gated(&self, kind: MatchKind, min_confidence: f64) -> impl Iterator<Item = &'a KeywordMatch> + use<'a> {
        self.matches.iter().filter(move |m| m.kind == kind && m.confidence >= min_confidence)
    }

    pub fn count(&self, kind: MatchKind) -> usize {
        self.matches.iter().filter(|m| m.kind == kind).count()
    }

    /// Chars in the text, as used by the length heuristics.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}
