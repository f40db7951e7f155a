//! Negation detection.
//!
//! Every confident `Negation` match cancels part of each carb penalty that
//! starts within 30 characters of it. The closer the two are, the more of
//! the penalty goes:
//!
//! ```text
//! distance <= 5   -> |weight| * 1.0
//! distance <= 15  -> |weight| * 0.7
//! otherwise       -> |weight| * 0.5
//! ```
//!
//! Carb penalties no negation match reached are then handed to the
//! substitution detector, whose phrase-level offset is added as one more
//! reason.

use super::Rule;
use crate::engine::RuleContext;
use crate::{KeywordMatch, MatchKind};

const WINDOW: usize = 30;

fn decay(distance: usize) -> f64 {
    if distance <= 5 {
        1.0
    } else if distance <= 15 {
        0.7
    } else {
        0.5
    }
}

pub(super) fn apply(rule: &Rule, ctx: &mut RuleContext<'_>) {
    if !ctx.kinds.has(MatchKind::HighCarb) {
        return;
    }
    let matches = ctx.matches;
    let mut covered: Vec<usize> = Vec::new();

    for neg in ctx.gated(MatchKind::Negation, rule.gate()) {
        let carbs = matches
            .iter()
            .filter(|m| m.kind == MatchKind::HighCarb && m.position.abs_diff(neg.position) <= WINDOW);
        for carb in carbs {
            let distance = carb.position.abs_diff(neg.position);
            let factor = decay(distance);
            let offset = carb.weight.abs() * factor;
            ctx.apply(
                rule.name(),
                format!("{}+{}", neg.keyword, carb.keyword),
                offset,
                format!("'{}' 제외 표현 ('{}', 거리 {distance}) 감점 {factor}배 상쇄", carb.keyword, neg.keyword),
            );
            covered.push(carb.position);
        }
    }

    let residual: Vec<KeywordMatch> = matches
        .iter()
        .filter(|m| m.kind == MatchKind::HighCarb && !covered.contains(&m.position))
        .cloned()
        .collect();
    if residual.is_empty() {
        return;
    }
    let offset = ctx.detector.offset_for(ctx.text, &residual);
    if offset > 0.0 {
        ctx.apply(rule.name(), "substitution_context", offset, "대체·제외 문구로 남은 탄수화물 감점 상쇄");
    }
}

#[cfg(test)]
mod tests {
    use super::super::RuleId;
    use super::super::test_support::{hit, run};
    use super::decay;
    use crate::MatchKind;

    #[test]
    fn decay_steps() {
        assert_eq!(decay(0), 1.0);
        assert_eq!(decay(5), 1.0);
        assert_eq!(decay(6), 0.7);
        assert_eq!(decay(15), 0.7);
        assert_eq!(decay(16), 0.5);
    }

    #[test]
    fn offsets_nearby_carb_by_distance() {
        let matches = [
            hit("비빔밥", MatchKind::HighCarb, -20.0, 0.9, 0),
            hit("제외", MatchKind::Negation, 10.0, 0.8, 7),
        ];
        let score = run(RuleId::NegationDetection, "비빔밥 (밥 제외)", &matches);
        assert!((score - 14.0).abs() < 1e-9);
    }

    #[test]
    fn carbs_outside_window_are_untouched() {
        let matches = [
            hit("라면", MatchKind::HighCarb, -30.0, 0.95, 0),
            hit("제외", MatchKind::Negation, 10.0, 0.8, 40),
        ];
        assert_eq!(run(RuleId::NegationDetection, "라면", &matches), 0.0);
    }

    #[test]
    fn window_is_inclusive_at_thirty_chars() {
        let at = |position| {
            let matches = [
                hit("라면", MatchKind::HighCarb, -30.0, 0.95, 0),
                hit("제외", MatchKind::Negation, 10.0, 0.8, position),
            ];
            run(RuleId::NegationDetection, "라면", &matches)
        };
        assert!((at(30) - 15.0).abs() < 1e-9);
        assert_eq!(at(31), 0.0);
    }

    #[test]
    fn low_confidence_negation_is_gated() {
        let matches = [
            hit("면", MatchKind::HighCarb, -20.0, 0.75, 0),
            hit("없이", MatchKind::Negation, 10.0, 0.6, 2),
        ];
        assert_eq!(run(RuleId::NegationDetection, "면", &matches), 0.0);
    }

    #[test]
    fn uncovered_carb_falls_back_to_phrase_offset() {
        // A substitute mention with the staple still matched: no negation
        // match, but the detector sees the substitution.
        let matches = [
            hit("konjac rice", MatchKind::Substitution, 20.0, 0.95, 0),
            hit("rice", MatchKind::HighCarb, -25.0, 0.9, 7),
        ];
        let score = run(RuleId::NegationDetection, "konjac rice bowl", &matches);
        assert!((score - 22.5).abs() < 1e-9);
    }
}
