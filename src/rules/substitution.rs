use super::Rule;
use crate::MatchKind;
use crate::engine::RuleContext;

const MULTIPLIER: f64 = 1.2;

pub(super) fn apply(rule: &Rule, ctx: &mut RuleContext<'_>) {
    for m in ctx.gated(MatchKind::Substitution, rule.gate()) {
        let bonus = m.weight * MULTIPLIER;
        ctx.apply(rule.name(), m.keyword.clone(), bonus, format!("저탄수 대체 '{}' 가점", m.keyword));
    }
}

#[cfg(test)]
mod tests {
    use super::super::RuleId;
    use super::super::test_support::{hit, run};
    use crate::MatchKind;

    #[test]
    fn substitutes_earn_weight_times_1_2() {
        let matches = [
            hit("곤약밥", MatchKind::Substitution, 20.0, 0.95, 0),
            hit("스테비아", MatchKind::Substitution, 8.0, 0.8, 5),
            hit("저탄수 옵션", MatchKind::Substitution, 12.0, 0.75, 10),
        ];
        let score = run(RuleId::SubstitutionBonus, "곤약밥 스테비아", &matches);
        assert!((score - (24.0 + 9.6)).abs() < 1e-9);
    }
}
