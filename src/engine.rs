//! Matching and scoring engine.
//!
//! Scoring one menu is a straight pipeline with no feedback between stages:
//!
//! ```text
//! KeywordDictionary (shared, read-only)
//!        │
//! text ──┼─ KeywordMatcher::find_matches        (matcher.rs)
//!        │    - literal pass, longest key first
//!        │    - regex pattern groups
//!        │    - positional dedup                 (dedup.rs)
//!        │
//!        ├─ SubstitutionDetector                 (substitution.rs)
//!        │    - substitute / exclusion phrasing, consulted by the negation rule
//!        v
//!  RuleEngine::evaluate                          (rule_engine.rs)
//!    - RuleContext per call                      (context.rs)
//!    - five ordered rules                        (src/rules/**)
//!    - clamp to [-100, 100]
//!    - confidence from the match list            (confidence.rs)
//!        │
//!        v
//!  post_process                                  (postprocess.rs)
//!    - clamp, price bonus, short-name confidence, category
//! ```
//!
//! Positions throughout are character offsets into the lower-cased text;
//! `text.rs` converts from the byte offsets `regex` reports.
//!
//! `RuleEngine::isolate` re-runs each rule alone against a fresh context;
//! `KetoScorer::explain` uses it to report standalone rule impact.
//! Timings for that report live in `metrics.rs`.
//!
//! ## Debugging
//!
//! Matching and rule application log at `debug`/`trace` through `tracing`.

#[path = "engine/confidence.rs"]
mod confidence;
#[path = "engine/context.rs"]
mod context;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/postprocess.rs"]
mod postprocess;
#[path = "engine/rule_engine.rs"]
mod rule_engine;
#[path = "engine/substitution.rs"]
mod substitution;
#[path = "engine/text.rs"]
mod text;

pub use confidence::ConfidenceBreakdown;
pub(crate) use confidence::confidence;
pub(crate) use context::RuleContext;
pub use matcher::KeywordMatcher;
pub use metrics::RunMetrics;
pub(crate) use postprocess::post_process;
pub(crate) use rule_engine::RuleEngine;
pub use substitution::{DetectionPath, NegationContext, SubstitutionContext, SubstitutionDetector};
