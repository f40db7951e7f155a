//! End-to-end scoring scenarios over the builtin dictionary.

use crate::*;

fn scorer() -> KetoScorer {
    KetoScorer::builtin().unwrap()
}

fn reason<'a>(score: &'a KetoScore, rule_id: &str) -> Vec<&'a ScoreReason> {
    score.reasons.iter().filter(|r| r.rule_id == rule_id).collect()
}

#[test]
fn salmon_steak_salad_is_recommended() {
    let menu = Menu::new("연어 스테이크 샐러드").with_description("").with_price(25_000);
    let score = scorer().score(&menu);

    assert_eq!(score.detected_keywords, vec!["연어", "스테이크", "샐러드"]);
    // 50 base, +5 keto stacking, +30 implicit strong keyword
    assert_eq!(score.raw_score, 85.0);
    assert_eq!(score.final_score, 85.0);
    assert!((score.confidence - 0.9195).abs() < 1e-9);
    assert!(score.final_score * score.confidence >= 40.0);
    assert_eq!(score.category, Category::Recommended);

    let context = reason(&score, "context_adjustment");
    assert!(context.iter().any(|r| r.keyword == "샐러드" && r.impact == 30.0));
    assert!(score.reasons.iter().all(|r| r.rule_id != "post_processing"));
}

#[test]
fn every_normal_score_lists_all_rules() {
    let score = scorer().score(&Menu::new("삼겹살 구이"));
    assert_eq!(
        score.applied_rules,
        vec!["base_scoring", "negation_detection", "substitution_bonus", "menu_type_penalty", "context_adjustment"]
    );
}

#[test]
fn bibimbap_alone() {
    let score = scorer().score(&Menu::new("비빔밥"));
    assert_eq!(score.detected_keywords, vec!["비빔밥"]);
    assert_eq!(score.final_score, -20.0);
    assert!((score.confidence - 0.73).abs() < 1e-9);
    assert_eq!(score.category, Category::Caution);
}

#[test]
fn negation_cancels_penalty() {
    let s = scorer();
    let plain = s.score(&Menu::new("비빔밥"));
    let negated = s.score(&Menu::new("비빔밥 (밥 제외)"));

    assert!(negated.final_score > plain.final_score);
    let negation = reason(&negated, "negation_detection");
    assert_eq!(negation.len(), 1);
    assert_eq!(negation[0].keyword, "제외+비빔밥");
    assert!((negation[0].impact - 14.0).abs() < 1e-9);
    assert!((negated.final_score - -6.0).abs() < 1e-9);
}

#[test]
fn substitution_beats_staple_carb() {
    let s = scorer();
    let konjac = s.score(&Menu::new("연어 곤약밥"));
    let rice = s.score(&Menu::new("연어 쌀밥"));

    let bonus = reason(&konjac, "substitution_bonus");
    assert_eq!(bonus.len(), 1);
    assert!((bonus[0].impact - 24.0).abs() < 1e-9);
    assert!(konjac.final_score > rice.final_score);
    assert!((konjac.final_score - 39.0).abs() < 1e-9);
    assert_eq!(rice.final_score, -10.0);
}

#[test]
fn substitute_phrase_offsets_remaining_staple() {
    let score = scorer().score(&Menu::new("konjac rice bowl"));
    let residual = reason(&score, "negation_detection");
    assert_eq!(residual.len(), 1);
    assert_eq!(residual[0].keyword, "substitution_context");
    assert!((residual[0].impact - 22.5).abs() < 1e-9);
}

#[test]
fn empty_match_fallback() {
    let score = scorer().score(&Menu::new("오늘의 추천").with_description("셰프 스페셜"));
    assert_eq!(score.confidence, 0.1);
    assert!(score.detected_keywords.is_empty());
    assert_eq!(score.final_score, 0.0);
    // Too unsure to commit to a band.
    assert_eq!(score.category, Category::Moderate);
}

#[test]
fn poke_bonus_depends_on_rice_base() {
    let s = scorer();
    let plain = s.score(&Menu::new("연어 포케"));
    let with_rice = s.score(&Menu::new("연어 포케 현미밥"));

    let poke = |score: &KetoScore| {
        score.reasons.iter().find(|r| r.keyword == "poke_bowl").map(|r| r.impact)
    };
    assert_eq!(poke(&plain), Some(40.0));
    assert_eq!(poke(&with_rice), Some(25.0));
    assert_eq!(plain.final_score, 67.0);
    assert_eq!(with_rice.final_score, 27.0);
}

#[test]
fn price_bonus_applies_after_rules() {
    let score = scorer().score(&Menu::new("연어 스테이크 샐러드").with_price(50_000));
    assert_eq!(score.raw_score, 85.0);
    assert_eq!(score.final_score, 90.0);
    let post = reason(&score, "post_processing");
    assert_eq!(post.len(), 1);
    assert_eq!(post[0].keyword, "price");
}

#[test]
fn scoring_is_deterministic() {
    let s = scorer();
    let menu = Menu::new("키토 도시락").with_description("곤약밥, 닭가슴살, 계란, 아보카도").with_price(12_000);
    let first = serde_json::to_string(&s.score(&menu)).unwrap();
    let second = serde_json::to_string(&s.score(&menu)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn scores_stay_in_bounds() {
    let s = scorer();
    let menus = [
        Menu::new("라면 김밥 떡볶이 만두 튀김 세트 곱빼기"),
        Menu::new("키토 저탄고지 스테이크 삼겹살 연어 샐러드 아보카도 치즈 베이컨").with_price(90_000),
        Menu::new("밥"),
        Menu::new("2인 세트 짜장면 탕수육 볶음밥"),
        Menu::new("no bun burger with cheese and bacon"),
        Menu::new("Ramen without noodles, extra egg"),
    ];
    for score in s.batch_score(&menus) {
        assert!((-100.0..=100.0).contains(&score.final_score), "{score:?}");
        assert!((-100.0..=100.0).contains(&score.raw_score), "{score:?}");
        assert!((0.0..=1.0).contains(&score.confidence), "{score:?}");
    }
}

#[test]
fn category_is_monotonic_in_score() {
    for confidence in [0.3, 0.5, 0.73, 0.95] {
        let mut previous = Category::classify(-100.0, confidence).rank();
        for step in -100..=100 {
            let rank = Category::classify(step as f64, confidence).rank();
            assert!(rank <= previous, "confidence {confidence}, score {step}");
            previous = rank;
        }
    }
}

#[test]
fn category_thresholds_are_inclusive() {
    assert_eq!(Category::classify(40.0, 1.0), Category::Recommended);
    assert_eq!(Category::classify(39.99, 1.0), Category::Moderate);
    assert_eq!(Category::classify(15.0, 1.0), Category::Moderate);
    assert_eq!(Category::classify(14.99, 1.0), Category::Caution);
    assert_eq!(Category::classify(-15.0, 1.0), Category::Caution);
    assert_eq!(Category::classify(-15.01, 1.0), Category::Avoid);

    // Thresholds apply to score * confidence.
    assert_eq!(Category::classify(80.0, 0.5), Category::Recommended);
    assert_eq!(Category::classify(-30.0, 0.5), Category::Caution);
    assert_eq!(Category::classify(-100.0, 0.29), Category::Moderate);
}

#[test]
fn errors_are_contained_in_batch() {
    let s = scorer();
    let menus = vec![
        Menu::new("연어 샐러드"),
        Menu::new(""),
        Menu::new("라면").with_price(-500),
        Menu::new("스테이크").with_description("x".repeat(MAX_TEXT_CHARS + 1)),
        Menu::new("비빔밥"),
    ];
    let scores = s.batch_score(&menus);
    assert_eq!(scores.len(), menus.len());

    for failed in &scores[1..4] {
        assert_eq!(failed.category, Category::Avoid);
        assert_eq!(failed.applied_rules, vec!["error_handling"]);
        assert_eq!(failed.final_score, 0.0);
        assert_eq!(failed.confidence, 0.1);
        assert!(failed.detected_keywords.is_empty());
        assert_eq!(failed.reasons.len(), 1);
        assert_eq!(failed.reasons[0].keyword, "error");
    }
    assert_eq!(scores[0], s.score(&menus[0]));
    assert_eq!(scores[4], s.score(&menus[4]));
}

#[test]
fn kind_set_summarises_matches() {
    let matcher = KeywordMatcher::new(builtin_dictionary().unwrap());
    let kinds = KindSet::of(&matcher.find_matches("비빔밥 (밥 제외)"));
    assert!(kinds.has(MatchKind::HighCarb));
    assert!(kinds.has(MatchKind::Negation));
    assert!(!kinds.has(MatchKind::KetoFriendly));
}

#[test]
fn score_serializes_to_wire_shape() {
    let value = serde_json::to_value(scorer().score(&Menu::new("연어 스테이크 샐러드"))).unwrap();
    assert_eq!(value["category"], "recommended");
    assert!(value["calculated_at"].as_str().unwrap().starts_with("2024-01-01T00:00:00"));
    assert_eq!(value["reasons"][0]["rule_id"], "base_scoring");
    assert!(value["detected_keywords"].is_array());
}

#[test]
fn custom_dictionary_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(DictionarySource::HighCarb.file_name()),
        r#"{"짜장면": {"weight": -30, "confidence": 0.9, "aliases": ["jajangmyeon"]}}"#,
    )
    .unwrap();

    let scorer = KetoScorer::from_sources(&DictionarySources::from_dir(dir.path()).unwrap()).unwrap();
    let score = scorer.score(&Menu::new("짜장면 곱빼기"));
    assert_eq!(score.detected_keywords, vec!["짜장면"]);
    assert_eq!(score.final_score, -30.0);

    // Not in this dictionary.
    assert!(scorer.score(&Menu::new("연어 샐러드")).detected_keywords.is_empty());
}
