//! Aggregate heuristics over the whole match list.
//!
//! Unlike the other rules this one has no per-match gate. It is a fixed list
//! of named adjustments, each of which looks at the full context and may add
//! one reason of its own:
//!
//! - `carb_stacking`: `-10 * (n - 1)` for two or more carb penalties
//! - `keto_stacking`: `+5 * (n - 2)` for three or more keto bonuses
//! - `detailed_description`: `+2` for text over 50 chars
//! - `strong_keyword`: salad or explicit keto wording
//! - `poke_bowl`: poke bowls, which usually come with an optional rice base
//!
//! A poke salad triggers both of the last two. The strong-keyword bonus is
//! capped for poke keywords, but the two still add up.

use super::Rule;
use crate::engine::RuleContext;
use crate::{KeywordMatch, MatchKind};

const CARB_STACK_PENALTY: f64 = -10.0;
const KETO_STACK_BONUS: f64 = 5.0;
const DETAILED_TEXT_CHARS: usize = 50;
const DETAILED_BONUS: f64 = 2.0;

const STRONG_TERMS: &[&str] = &["샐러드", "salad", "키토", "keto", "케토", "저탄고지", "lchf", "low-carb-high-fat"];
const EXPLICIT_TERMS: &[&str] = &["키토", "keto", "케토"];
const POKE_TERMS: &[&str] = &["포케", "poke"];
const RICE_FAMILY: &[&str] = &["밥", "현미", "잡곡", "곡물", "쌀", "rice", "grain"];

/// `(explicit, no carbs) -> bonus`
const STRONG_BONUS: [[f64; 2]; 2] = [[18.0, 30.0], [25.0, 40.0]];
const POKE_CAPPED_BONUS: [f64; 2] = [6.0, 10.0];
const POKE_BONUS_NO_RICE: f64 = 40.0;
const POKE_BONUS_WITH_RICE: f64 = 25.0;

struct Adjustment {
    name: &'static str,
    eval: fn(&RuleContext<'_>) -> Option<(String, f64, String)>,
}

static ADJUSTMENTS: [Adjustment; 5] = [
    Adjustment { name: "carb_stacking", eval: carb_stacking },
    Adjustment { name: "keto_stacking", eval: keto_stacking },
    Adjustment { name: "detailed_description", eval: detailed_description },
    Adjustment { name: "strong_keyword", eval: strong_keyword },
    Adjustment { name: "poke_bowl", eval: poke_bowl },
];

pub(super) fn apply(rule: &Rule, ctx: &mut RuleContext<'_>) {
    for adjustment in &ADJUSTMENTS {
        if let Some((keyword, impact, explanation)) = (adjustment.eval)(ctx) {
            tracing::trace!(adjustment = adjustment.name, impact, "context adjustment");
            ctx.apply(rule.name(), keyword, impact, explanation);
        }
    }
}

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| haystack.contains(t))
}

fn carb_stacking(ctx: &RuleContext<'_>) -> Option<(String, f64, String)> {
    let n = ctx.count(MatchKind::HighCarb);
    (n >= 2).then(|| {
        let penalty = CARB_STACK_PENALTY * (n - 1) as f64;
        ("carb_stacking".to_string(), penalty, format!("탄수화물 키워드 {n}개 중복"))
    })
}

fn keto_stacking(ctx: &RuleContext<'_>) -> Option<(String, f64, String)> {
    let n = ctx.count(MatchKind::KetoFriendly);
    (n >= 3).then(|| {
        let bonus = KETO_STACK_BONUS * (n - 2) as f64;
        ("keto_stacking".to_string(), bonus, format!("키토 친화 키워드 {n}개"))
    })
}

fn detailed_description(ctx: &RuleContext<'_>) -> Option<(String, f64, String)> {
    (ctx.text_len() > DETAILED_TEXT_CHARS)
        .then(|| ("detailed_description".to_string(), DETAILED_BONUS, "상세한 메뉴 설명".to_string()))
}

fn strong_keyword(ctx: &RuleContext<'_>) -> Option<(String, f64, String)> {
    if !ctx.kinds.has(MatchKind::KetoFriendly) {
        return None;
    }
    let trigger: &KeywordMatch =
        ctx.matches.iter().find(|m| m.kind == MatchKind::KetoFriendly && contains_any(&m.keyword, STRONG_TERMS))?;
    let explicit = contains_any(&trigger.keyword, EXPLICIT_TERMS);
    let no_carbs = !ctx.kinds.has(MatchKind::HighCarb);

    let mut bonus = STRONG_BONUS[explicit as usize][no_carbs as usize];
    if contains_any(&trigger.keyword, POKE_TERMS) {
        bonus = bonus.min(POKE_CAPPED_BONUS[no_carbs as usize]);
    }

    let kind = if explicit { "명시적 키토" } else { "샐러드류" };
    Some((trigger.keyword.clone(), bonus, format!("{kind} 키워드 '{}' 가점", trigger.keyword)))
}

fn poke_bowl(ctx: &RuleContext<'_>) -> Option<(String, f64, String)> {
    let mentioned =
        contains_any(ctx.text, POKE_TERMS) || ctx.matches.iter().any(|m| contains_any(&m.keyword, POKE_TERMS));
    if !mentioned {
        return None;
    }
    if contains_any(ctx.text, RICE_FAMILY) {
        Some(("poke_bowl".to_string(), POKE_BONUS_WITH_RICE, "포케 (밥 베이스 포함)".to_string()))
    } else {
        Some(("poke_bowl".to_string(), POKE_BONUS_NO_RICE, "포케 (밥 없는 베이스)".to_string()))
    }
}
