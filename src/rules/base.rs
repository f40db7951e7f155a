//! Base scoring: every confident carb penalty and keto bonus counts once.

use super::Rule;
use crate::engine::RuleContext;
use crate::MatchKind;

pub(super) fn apply(rule: &Rule, ctx: &mut RuleContext<'_>) {
    let matches = ctx.matches;
    for m in matches.iter().filter(|m| m.confidence >= rule.gate()) {
        let explanation = match m.kind {
            MatchKind::HighCarb => format!("고탄수화물 키워드 '{}' 감점", m.keyword),
            MatchKind::KetoFriendly => format!("키토 친화 키워드 '{}' 가점", m.keyword),
            _ => continue,
        };
        ctx.apply(rule.name(), m.keyword.clone(), m.weight, explanation);
    }
}

#[cfg(test)]
mod tests {
    use super::super::RuleId;
    use super::super::test_support::{hit, run};
    use crate::MatchKind;

    #[test]
    fn sums_carb_and_keto_weights() {
        let matches = [
            hit("밥", MatchKind::HighCarb, -25.0, 0.9, 0),
            hit("연어", MatchKind::KetoFriendly, 15.0, 0.9, 4),
            hit("세트", MatchKind::MenuType, -5.0, 0.65, 8),
        ];
        assert_eq!(run(RuleId::BaseScoring, "밥 연어 세트", &matches), -10.0);
    }

    #[test]
    fn low_confidence_matches_are_ignored() {
        let matches = [hit("면", MatchKind::HighCarb, -20.0, 0.4, 0)];
        assert_eq!(run(RuleId::BaseScoring, "면", &matches), 0.0);
    }
}
