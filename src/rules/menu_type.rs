use super::Rule;
use crate::MatchKind;
use crate::engine::RuleContext;

const MULTIPLIER: f64 = 1.0;

pub(super) fn apply(rule: &Rule, ctx: &mut RuleContext<'_>) {
    for m in ctx.gated(MatchKind::MenuType, rule.gate()) {
        let penalty = m.weight * MULTIPLIER;
        ctx.apply(rule.name(), m.keyword.clone(), penalty, format!("메뉴 유형 '{}' 감점", m.keyword));
    }
}
