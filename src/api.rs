use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{
    self, ConfidenceBreakdown, KeywordMatcher, NegationContext, RuleEngine, RunMetrics, SubstitutionContext,
    SubstitutionDetector,
};
use crate::{ConfigError, DictionarySources, KetoScore, KeywordDictionary, KeywordMatch, Menu, ScoringError};

/// Longest `name + description` accepted, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Scoring context.
///
/// Holds the environment a score depends on besides the menu itself.
#[derive(Debug, Clone)]
pub struct Context {
    /// Timestamp stamped onto every produced [`KetoScore`].
    pub calculated_at: DateTime<Utc>,
}

impl Default for Context {
    fn default() -> Self {
        if cfg!(test) {
            // 2024-01-01T00:00:00Z
            Self { calculated_at: DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default() }
        } else {
            Self { calculated_at: Utc::now() }
        }
    }
}

/// Options that affect how a batch is scored. Never affect the scores.
#[derive(Debug, Clone)]
pub struct Options {
    /// Scoped worker threads used by [`KetoScorer::batch_score_with`].
    pub batch_workers: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { batch_workers: 1 }
    }
}

/// One rule's standalone effect, from [`KetoScorer::explain`].
#[derive(Debug, Clone, Serialize)]
pub struct RuleTrace {
    pub rule_id: &'static str,
    pub min_confidence: Option<f64>,
    /// Score the rule produces when run alone from zero.
    pub standalone_impact: f64,
    pub reasons: Vec<crate::ScoreReason>,
}

/// Everything [`KetoScorer::explain`] knows about one scoring run.
///
/// `score` is identical to what [`KetoScorer::score_with`] returns for the
/// same menu and context.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreExplanation {
    /// Lower-cased text the matchers saw.
    pub text: String,
    pub score: KetoScore,
    pub matches: Vec<KeywordMatch>,
    pub substitutions: Vec<SubstitutionContext>,
    pub negations: Vec<NegationContext>,
    pub rules: Vec<RuleTrace>,
    pub confidence: ConfidenceBreakdown,
    pub metrics: RunMetrics,
    /// Set when scoring failed and `score` is the fallback.
    pub error: Option<String>,
}

/// Scores menus against one shared, read-only dictionary.
///
/// Cheap to clone; clones share the dictionary.
#[derive(Debug, Clone)]
pub struct KetoScorer {
    dictionary: Arc<KeywordDictionary>,
    matcher: KeywordMatcher,
    detector: SubstitutionDetector,
    engine: RuleEngine,
}

/// Internal result of one successful run, shared by `score` and `explain`.
struct Run {
    text: String,
    matches: Vec<KeywordMatch>,
    confidence: ConfidenceBreakdown,
    score: KetoScore,
    metrics: RunMetrics,
}

impl KetoScorer {
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        let matcher = KeywordMatcher::new(Arc::clone(&dictionary));
        let detector = SubstitutionDetector::new(&dictionary);
        Self { dictionary, matcher, detector, engine: RuleEngine::default() }
    }

    /// Scorer over the process-wide builtin dictionary.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self::new(crate::builtin_dictionary()?))
    }

    pub fn from_sources(sources: &DictionarySources) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(KeywordDictionary::load(sources)?)))
    }

    pub fn dictionary(&self) -> &Arc<KeywordDictionary> {
        &self.dictionary
    }

    /// Score `menu` with a default [`Context`].
    ///
    /// Never fails: a menu that cannot be scored gets the fallback score
    /// (category `Avoid`, `applied_rules == ["error_handling"]`).
    pub fn score(&self, menu: &Menu) -> KetoScore {
        self.score_with(menu, &Context::default())
    }

    pub fn score_with(&self, menu: &Menu, context: &Context) -> KetoScore {
        match self.try_score_with(menu, context) {
            Ok(score) => score,
            Err(err) => {
                warn!(menu = %menu.name, error = %err, "scoring failed, returning fallback score");
                KetoScore::fallback(&err, context.calculated_at)
            }
        }
    }

    pub fn try_score(&self, menu: &Menu) -> Result<KetoScore, ScoringError> {
        self.try_score_with(menu, &Context::default())
    }

    /// Like [`score_with`](Self::score_with), but hands the error back.
    pub fn try_score_with(&self, menu: &Menu, context: &Context) -> Result<KetoScore, ScoringError> {
        guarded(|| self.run(menu, context)).map(|run| run.score)
    }

    /// Score every menu in order, one at a time.
    pub fn batch_score(&self, menus: &[Menu]) -> Vec<KetoScore> {
        let context = Context::default();
        menus.iter().map(|menu| self.score_with(menu, &context)).collect()
    }

    /// Score every menu in order, split across `options.batch_workers`
    /// scoped threads.
    ///
    /// Items never affect each other. A panic while scoring one menu becomes
    /// that menu's fallback score, the same as in [`batch_score`](Self::batch_score).
    pub fn batch_score_with(&self, menus: &[Menu], context: &Context, options: &Options) -> Vec<KetoScore> {
        let workers = options.batch_workers.clamp(1, menus.len().max(1));
        if workers == 1 {
            return menus.iter().map(|menu| self.score_with(menu, context)).collect();
        }

        let chunk_size = menus.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = menus
                .chunks(chunk_size)
                .map(|chunk| {
                    let handle = scope.spawn(move || {
                        chunk.iter().map(|menu| self.score_with(menu, context)).collect::<Vec<_>>()
                    });
                    (chunk.len(), handle)
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|(len, handle)| match handle.join() {
                    Ok(scores) => scores,
                    Err(payload) => {
                        warn!(items = len, "batch worker panicked, returning fallback scores");
                        let err = ScoringError::Panicked { message: panic_message(payload.as_ref()) };
                        vec![KetoScore::fallback(&err, context.calculated_at); len]
                    }
                })
                .collect()
        })
    }

    pub fn explain(&self, menu: &Menu) -> ScoreExplanation {
        self.explain_with(menu, &Context::default())
    }

    /// Score `menu` and report how the score came about.
    ///
    /// Besides the normal run, every rule is re-run alone against a fresh
    /// context so its standalone impact can be shown.
    pub fn explain_with(&self, menu: &Menu, context: &Context) -> ScoreExplanation {
        let run = match guarded(|| self.run(menu, context)) {
            Ok(run) => run,
            Err(err) => {
                warn!(menu = %menu.name, error = %err, "scoring failed, explaining fallback score");
                return ScoreExplanation {
                    text: menu.search_text(),
                    score: KetoScore::fallback(&err, context.calculated_at),
                    matches: Vec::new(),
                    substitutions: Vec::new(),
                    negations: Vec::new(),
                    rules: Vec::new(),
                    confidence: engine::confidence(&[]),
                    metrics: RunMetrics::default(),
                    error: Some(err.to_string()),
                };
            }
        };

        let rules = self
            .engine
            .isolate(&run.text, &run.matches, &self.detector)
            .into_iter()
            .map(|isolated| RuleTrace {
                rule_id: isolated.rule.name(),
                min_confidence: isolated.rule.min_confidence,
                standalone_impact: isolated.impact,
                reasons: isolated.reasons,
            })
            .collect();

        ScoreExplanation {
            substitutions: self.detector.detect_substitutions(&run.text),
            negations: self.detector.detect_negations(&run.text),
            text: run.text,
            score: run.score,
            matches: run.matches,
            rules,
            confidence: run.confidence,
            metrics: run.metrics,
            error: None,
        }
    }

    fn run(&self, menu: &Menu, context: &Context) -> Result<Run, ScoringError> {
        let started = Instant::now();
        let text = validate(menu)?;

        let matching_started = Instant::now();
        let matches = self.matcher.find_matches(&text);
        let matching = matching_started.elapsed();

        let rules_started = Instant::now();
        let outcome = self.engine.evaluate(&text, &matches, &self.detector);
        let rules = rules_started.elapsed();
        if !outcome.raw_score.is_finite() {
            return Err(ScoringError::NonFiniteScore { stage: "rules" });
        }

        let post_started = Instant::now();
        let post = engine::post_process(outcome.raw_score, outcome.confidence.value, menu);
        let post_processing = post_started.elapsed();
        if !post.final_score.is_finite() || !post.confidence.is_finite() {
            return Err(ScoringError::NonFiniteScore { stage: "post_processing" });
        }

        let mut reasons = outcome.reasons;
        reasons.extend(post.reasons);

        let score = KetoScore {
            raw_score: outcome.raw_score,
            final_score: post.final_score,
            confidence: post.confidence,
            category: post.category,
            reasons,
            detected_keywords: detected_keywords(&matches),
            applied_rules: outcome.applied_rules.iter().map(|id| id.to_string()).collect(),
            calculated_at: context.calculated_at,
        };
        debug!(
            menu = %menu.name,
            final_score = score.final_score,
            confidence = score.confidence,
            category = score.category.as_str(),
            "menu scored"
        );

        let metrics = RunMetrics { total: started.elapsed(), matching, rules, post_processing };
        Ok(Run { text, matches, confidence: outcome.confidence, score, metrics })
    }
}

/// Run one scoring step, turning a panic into [`ScoringError::Panicked`].
fn guarded<T>(f: impl FnOnce() -> Result<T, ScoringError>) -> Result<T, ScoringError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(ScoringError::Panicked { message: panic_message(payload.as_ref()) }))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Reject menus the engine cannot score; returns the text to match against.
fn validate(menu: &Menu) -> Result<String, ScoringError> {
    if menu.name.trim().is_empty() {
        return Err(ScoringError::EmptyName);
    }
    if let Some(price) = menu.price.filter(|&p| p < 0) {
        return Err(ScoringError::NegativePrice { price });
    }
    let text = menu.search_text();
    let len = text.chars().count();
    if len > MAX_TEXT_CHARS {
        return Err(ScoringError::TextTooLong { len, max: MAX_TEXT_CHARS });
    }
    Ok(text)
}

/// Matched keywords, first occurrence order, without repeats.
fn detected_keywords(matches: &[KeywordMatch]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::with_capacity(matches.len());
    for m in matches {
        if !keywords.contains(&m.keyword) {
            keywords.push(m.keyword.clone());
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    fn scorer() -> KetoScorer {
        KetoScorer::builtin().unwrap()
    }

    #[test]
    fn default_context_is_fixed_under_test() {
        assert_eq!(Context::default().calculated_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn score_with_stamps_context_time() {
        let ctx = Context { calculated_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap() };
        let score = scorer().score_with(&Menu::new("삼겹살 구이"), &ctx);
        assert_eq!(score.calculated_at, ctx.calculated_at);
    }

    #[test]
    fn invalid_menus_are_rejected_by_try_score() {
        let s = scorer();
        let ctx = Context::default();
        assert_eq!(s.try_score_with(&Menu::new("   "), &ctx), Err(ScoringError::EmptyName));
        assert_eq!(
            s.try_score_with(&Menu::new("라면").with_price(-1), &ctx),
            Err(ScoringError::NegativePrice { price: -1 })
        );
        let long = Menu::new("샐러드").with_description("가".repeat(MAX_TEXT_CHARS));
        assert!(matches!(s.try_score_with(&long, &ctx), Err(ScoringError::TextTooLong { .. })));
    }

    #[test]
    fn panics_become_scoring_errors() {
        let r: Result<(), _> = guarded(|| panic!("boom"));
        assert_eq!(r, Err(ScoringError::Panicked { message: "boom".to_string() }));

        let r: Result<(), _> = guarded(|| panic!("{} items", 3));
        assert_eq!(r, Err(ScoringError::Panicked { message: "3 items".to_string() }));

        assert_eq!(guarded(|| Ok(7)), Ok(7));

        let err = ScoringError::Panicked { message: "boom".to_string() };
        let fallback = KetoScore::fallback(&err, Context::default().calculated_at);
        assert_eq!(fallback.category, Category::Avoid);
    }

    #[test]
    fn detected_keywords_keep_first_occurrence_order() {
        let score = scorer().score(&Menu::new("연어 스테이크 샐러드"));
        assert_eq!(score.detected_keywords, vec!["연어", "스테이크", "샐러드"]);
    }

    #[test]
    fn explain_matches_score() {
        let s = scorer();
        let menu = Menu::new("비빔밥 (밥 제외)");
        let explanation = s.explain(&menu);
        assert_eq!(explanation.score, s.score(&menu));
        assert_eq!(explanation.rules.len(), 5);
        assert!(explanation.error.is_none());
        assert_eq!(explanation.confidence.value, explanation.score.confidence);
        assert!(explanation.metrics.total >= explanation.metrics.matching);
    }

    #[test]
    fn explain_reports_fallback() {
        let explanation = scorer().explain(&Menu::new(""));
        assert_eq!(explanation.score.category, Category::Avoid);
        assert!(explanation.rules.is_empty());
        assert_eq!(explanation.error.as_deref(), Some("menu name is empty"));
    }

    #[test]
    fn parallel_batch_preserves_order() {
        let s = scorer();
        let menus: Vec<Menu> =
            ["라면", "", "연어 샐러드", "곤약밥 정식", "비빔밥", "스테이크"].into_iter().map(Menu::new).collect();
        let ctx = Context::default();
        let sequential = s.batch_score_with(&menus, &ctx, &Options::default());
        let parallel = s.batch_score_with(&menus, &ctx, &Options { batch_workers: 4 });
        assert_eq!(sequential, parallel);
        assert_eq!(parallel[1].applied_rules, vec!["error_handling"]);
    }
}
