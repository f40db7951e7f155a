//! Post-processing of the rule engine's raw score.
//!
//! ```text
//! raw_score ─ clamp ─ price bonus ─ clamp ─ short-name confidence ─ category
//! ```
//!
//! Each step that changes the score or the confidence records a reason under
//! the `post_processing` rule id.

use crate::{Category, Menu, ScoreReason};

pub(crate) const RULE_ID: &str = "post_processing";
pub(crate) const SCORE_MIN: f64 = -100.0;
pub(crate) const SCORE_MAX: f64 = 100.0;

const PRICE_THRESHOLD: i64 = 30_000;
const PRICE_UNIT: f64 = 10_000.0;
const MAX_PRICE_BONUS: f64 = 5.0;
const SHORT_NAME_CHARS: usize = 3;
const SHORT_NAME_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PostProcessed {
    pub final_score: f64,
    pub confidence: f64,
    pub category: Category,
    pub reasons: Vec<ScoreReason>,
}

pub(crate) fn post_process(raw_score: f64, confidence: f64, menu: &Menu) -> PostProcessed {
    let mut reasons = Vec::new();

    let mut score = clamp_with_reason(raw_score, &mut reasons);

    if let Some(price) = menu.price.filter(|&p| p > PRICE_THRESHOLD) {
        if score > 0.0 {
            let bonus = (price as f64 / PRICE_UNIT).min(MAX_PRICE_BONUS);
            score += bonus;
            reasons.push(ScoreReason::new(
                RULE_ID,
                "price",
                bonus,
                format!("가격대 {price}원: 재료 품질 가산점 {bonus:.1}"),
            ));
            score = clamp_with_reason(score, &mut reasons);
        }
    }

    let mut confidence = confidence;
    if menu.name.trim().chars().count() < SHORT_NAME_CHARS {
        confidence *= SHORT_NAME_FACTOR;
        reasons.push(ScoreReason::new(
            RULE_ID,
            "name_length",
            0.0,
            format!("메뉴명이 {SHORT_NAME_CHARS}자 미만이라 신뢰도 {SHORT_NAME_FACTOR}배"),
        ));
    }

    PostProcessed { final_score: score, confidence, category: Category::classify(score, confidence), reasons }
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    score.clamp(SCORE_MIN, SCORE_MAX)
}

fn clamp_with_reason(score: f64, reasons: &mut Vec<ScoreReason>) -> f64 {
    let clamped = clamp_score(score);
    if clamped != score {
        reasons.push(ScoreReason::new(
            RULE_ID,
            "clamp",
            clamped - score,
            format!("점수를 {SCORE_MIN}..{SCORE_MAX} 범위로 제한 ({score:.1} → {clamped:.1})"),
        ));
    }
    clamped
}
