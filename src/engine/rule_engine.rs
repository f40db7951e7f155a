//! Drives the ordered rules over one match list.

use tracing::debug;

use super::confidence::{ConfidenceBreakdown, confidence};
use super::context::RuleContext;
use super::postprocess::clamp_score;
use super::substitution::SubstitutionDetector;
use crate::rules::{self, Rule};
use crate::{KeywordMatch, ScoreReason};

const CLAMP_RULE: &str = "clamp";

/// What the rules produced for one menu, before post-processing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RuleOutcome {
    pub raw_score: f64,
    pub confidence: ConfidenceBreakdown,
    pub reasons: Vec<ScoreReason>,
    pub applied_rules: Vec<&'static str>,
}

/// A rule's effect when run alone against a fresh context.
#[derive(Debug, Clone)]
pub(crate) struct Isolated {
    pub rule: &'static Rule,
    pub impact: f64,
    pub reasons: Vec<ScoreReason>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleEngine {
    rules: &'static [Rule],
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self { rules: rules::get() }
    }
}

impl RuleEngine {
    pub fn evaluate(&self, text: &str, matches: &[KeywordMatch], detector: &SubstitutionDetector) -> RuleOutcome {
        let mut ctx = RuleContext::new(text, matches, detector);
        for rule in self.rules {
            let before = ctx.current_score;
            rule.run(&mut ctx);
            ctx.applied_rules.push(rule.name());
            debug!(rule = rule.name(), delta = ctx.current_score - before, score = ctx.current_score, "rule applied");
        }

        let clamped = clamp_score(ctx.current_score);
        if clamped != ctx.current_score {
            let impact = clamped - ctx.current_score;
            ctx.apply(CLAMP_RULE, "clamp", impact, format!("규칙 점수 {:.1}을 범위 안으로 제한", ctx.current_score));
        }

        RuleOutcome {
            raw_score: ctx.current_score,
            confidence: confidence(matches),
            reasons: ctx.reasons,
            applied_rules: ctx.applied_rules,
        }
    }

    /// Every rule run alone, in order, each against its own fresh context.
    pub fn isolate(&self, text: &str, matches: &[KeywordMatch], detector: &SubstitutionDetector) -> Vec<Isolated> {
        let base = RuleContext::new(text, matches, detector);
        self.rules
            .iter()
            .map(|rule| {
                let mut ctx = base.fresh();
                rule.run(&mut ctx);
                Isolated { rule, impact: ctx.current_score, reasons: ctx.reasons }
            })
            .collect()
    }
}
