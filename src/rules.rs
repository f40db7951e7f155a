//! The five scoring rules, in the order they run.
//!
//! Each rule is a plain function over the shared [`RuleContext`]. Rules never
//! branch on each other's output: they always run in the fixed order below,
//! and the only thing that can skip work is a rule's own per-match
//! confidence gate.
//!
//! ```text
//! base_scoring        (>= 0.5)  HighCarb / KetoFriendly weights
//! negation_detection  (>= 0.7)  distance-decayed offsets for excluded carbs
//! substitution_bonus  (>= 0.8)  substitute weight x 1.2
//! menu_type_penalty   (>= 0.6)  menu type weight x 1.0
//! context_adjustment  (none)    aggregate heuristics over all matches
//! ```

#[path = "rules/base.rs"]
mod base;
#[path = "rules/context_adjustment.rs"]
mod context_adjustment;
#[path = "rules/menu_type.rs"]
mod menu_type;
#[path = "rules/negation.rs"]
mod negation;
#[path = "rules/substitution.rs"]
mod substitution;

use crate::engine::RuleContext;

/// Identity of a scoring rule; the string form appears in reasons and
/// `applied_rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RuleId {
    BaseScoring,
    NegationDetection,
    SubstitutionBonus,
    MenuTypePenalty,
    ContextAdjustment,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::BaseScoring => "base_scoring",
            RuleId::NegationDetection => "negation_detection",
            RuleId::SubstitutionBonus => "substitution_bonus",
            RuleId::MenuTypePenalty => "menu_type_penalty",
            RuleId::ContextAdjustment => "context_adjustment",
        }
    }
}

/// A scoring rule: identity, confidence gate and the function that applies it.
pub(crate) struct Rule {
    pub id: RuleId,
    /// Matches below this confidence are ignored by the rule.
    pub min_confidence: Option<f64>,
    pub apply: fn(&Rule, &mut RuleContext<'_>),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        self.id.as_str()
    }

    pub fn gate(&self) -> f64 {
        self.min_confidence.unwrap_or(0.0)
    }

    pub fn run(&self, ctx: &mut RuleContext<'_>) {
        (self.apply)(self, ctx);
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("min_confidence", &self.min_confidence)
            .field("apply", &"<function>")
            .finish()
    }
}

static RULES: [Rule; 5] = [
    Rule { id: RuleId::BaseScoring, min_confidence: Some(0.5), apply: base::apply },
    Rule { id: RuleId::NegationDetection, min_confidence: Some(0.7), apply: negation::apply },
    Rule { id: RuleId::SubstitutionBonus, min_confidence: Some(0.8), apply: substitution::apply },
    Rule { id: RuleId::MenuTypePenalty, min_confidence: Some(0.6), apply: menu_type::apply },
    Rule { id: RuleId::ContextAdjustment, min_confidence: None, apply: context_adjustment::apply },
];

/// All rules in evaluation order.
pub(crate) fn get() -> &'static [Rule] {
    &RULES
}
