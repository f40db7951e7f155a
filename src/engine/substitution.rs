//! Substitution and negation phrase detection.
//!
//! This runs independently of [`KeywordMatcher`](super::KeywordMatcher): it
//! looks for phrases that say a staple carb was swapped out ("곤약밥",
//! "밥 대신 두부", "replace rice with cauliflower") or left out ("면 제외",
//! "no bread", "밥 선택"), and turns them into an offset against the carb
//! penalties already matched. The negation rule consumes that offset.

use serde::Serialize;
use tracing::trace;

use super::text::CharText;
use crate::{KeywordDictionary, KeywordMatch, MatchKind};

/// Chars either side of a substitute term searched for the carb it replaces.
const SUBSTITUTE_WINDOW: usize = 30;
const DIRECT_CONFIDENCE: f64 = 0.9;
const INSTEAD_OF_CONFIDENCE: f64 = 0.95;
const EXCLUSION_CONFIDENCE: f64 = 0.9;
const OPTIONAL_CONFIDENCE: f64 = 0.7;
/// Negations only cancel half of a penalty; substitutions cancel all of it.
const NEGATION_SHARE: f64 = 0.5;

/// How a substitution was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionPath {
    DirectMention,
    InsteadOf,
}

/// A staple carb replaced by a low-carb alternative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionContext {
    pub original: String,
    pub substitute: String,
    pub position: usize,
    pub confidence: f64,
    pub path: DetectionPath,
}

/// A staple carb that is excluded, or merely optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegationContext {
    pub carb: String,
    pub phrase: String,
    pub position: usize,
    pub confidence: f64,
    pub optional: bool,
}

#[derive(Debug, Clone)]
struct SubstituteTerm {
    surfaces: Vec<String>,
    replaces: Vec<String>,
}

/// Detects substitution and exclusion phrasing around staple carbs.
#[derive(Debug, Clone)]
pub struct SubstitutionDetector {
    terms: Vec<SubstituteTerm>,
}

impl SubstitutionDetector {
    /// Collect every substitute that declares which carbs it replaces.
    pub fn new(dictionary: &KeywordDictionary) -> Self {
        let terms = dictionary
            .entries(MatchKind::Substitution)
            .filter(|entry| !entry.replaces.is_empty())
            .map(|entry| SubstituteTerm {
                surfaces: entry.surface_forms().map(str::to_string).collect(),
                replaces: entry.replaces.clone(),
            })
            .collect();
        Self { terms }
    }

    pub fn detect_substitutions(&self, text: &str) -> Vec<SubstitutionContext> {
        let lower = text.to_lowercase();
        let text = CharText::new(&lower);
        let mut found = Vec::new();

        for term in &self.terms {
            // One detection per substitute, from its first surface form present.
            let Some((surface, position)) =
                term.surfaces.iter().find_map(|s| text.find(s).map(|p| (s.as_str(), p)))
            else {
                continue;
            };
            let end = position + surface.chars().count();
            let window = text.slice(position.saturating_sub(SUBSTITUTE_WINDOW), end + SUBSTITUTE_WINDOW);
            if let Some(original) = term.replaces.iter().find(|carb| window.contains(carb.as_str())) {
                found.push(SubstitutionContext {
                    original: original.clone(),
                    substitute: surface.to_string(),
                    position,
                    confidence: DIRECT_CONFIDENCE,
                    path: DetectionPath::DirectMention,
                });
            }
        }

        // "<carb> 대신 <substitute>"
        for caps in regex!(concat!(carb_terms!(), r"\s*대신\s*(\S+)")).captures_iter(text.as_str()) {
            if let (Some(whole), Some(carb), Some(substitute)) = (caps.get(0), caps.get(1), caps.get(2)) {
                found.push(instead_of(&text, whole.start(), carb.as_str(), substitute.as_str()));
            }
        }
        // "replace <carb> with <substitute>"
        let replace_with = regex!(concat!(r"\b(?:replace|swap)\s+(?:the\s+)?", carb_terms!(), r"\s+with\s+(\S+)"));
        for caps in replace_with.captures_iter(text.as_str()) {
            if let (Some(whole), Some(carb), Some(substitute)) = (caps.get(0), caps.get(1), caps.get(2)) {
                found.push(instead_of(&text, whole.start(), carb.as_str(), substitute.as_str()));
            }
        }
        // "<substitute> instead of <carb>"
        let instead = regex!(concat!(r"(\S+)\s+instead\s+of\s+", carb_terms!()));
        for caps in instead.captures_iter(text.as_str()) {
            if let (Some(whole), Some(substitute), Some(carb)) = (caps.get(0), caps.get(1), caps.get(2)) {
                found.push(instead_of(&text, whole.start(), carb.as_str(), substitute.as_str()));
            }
        }

        trace!(count = found.len(), "substitutions detected");
        found
    }

    pub fn detect_negations(&self, text: &str) -> Vec<NegationContext> {
        let lower = text.to_lowercase();
        let text = CharText::new(&lower);
        let mut found = Vec::new();

        let carb_first = [
            (regex!(concat!(carb_terms!(), r"\s*(?:제외|빼고|뺀|없이|빼\s*주세요)")), false),
            (regex!(concat!(carb_terms!(), r"\s+(?:excluded|removed)")), false),
            (regex!(concat!(carb_terms!(), r"\s*(?:선택|추가\s*가능|별도|옵션)")), true),
            (regex!(concat!(carb_terms!(), r"\s+(?:optional|on the side)")), true),
        ];
        let carb_last = [
            (regex!(concat!(r"\b(?:no|without|hold the)\s+", carb_terms!())), false),
            (regex!(concat!(r"\b(?:optional|extra)\s+", carb_terms!())), true),
        ];

        for (regex, optional) in carb_first.into_iter().chain(carb_last) {
            for caps in regex.captures_iter(text.as_str()) {
                let (Some(whole), Some(carb)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                found.push(NegationContext {
                    carb: carb.as_str().to_string(),
                    phrase: whole.as_str().to_string(),
                    position: text.char_at(whole.start()),
                    confidence: if optional { OPTIONAL_CONFIDENCE } else { EXCLUSION_CONFIDENCE },
                    optional,
                });
            }
        }

        found.sort_by_key(|n| n.position);
        trace!(count = found.len(), "negations detected");
        found
    }

    /// Penalty offset implied by the substitutions and negations in `text`.
    ///
    /// Only carbs with a penalty among `matches` count. Substitutions cancel
    /// `|penalty| * confidence`; negations cancel half of that.
    pub fn offset_for(&self, text: &str, matches: &[KeywordMatch]) -> f64 {
        let substituted: f64 = self
            .detect_substitutions(text)
            .iter()
            .filter_map(|sub| penalty_for(&sub.original, matches).map(|p| p.abs() * sub.confidence))
            .sum();
        let negated: f64 = self
            .detect_negations(text)
            .iter()
            .filter_map(|neg| penalty_for(&neg.carb, matches).map(|p| p.abs() * NEGATION_SHARE * neg.confidence))
            .sum();
        substituted + negated
    }
}

fn instead_of(text: &CharText<'_>, byte: usize, carb: &str, substitute: &str) -> SubstitutionContext {
    SubstitutionContext {
        original: carb.to_string(),
        substitute: substitute.to_string(),
        position: text.char_at(byte),
        confidence: INSTEAD_OF_CONFIDENCE,
        path: DetectionPath::InsteadOf,
    }
}

/// Weight of the first carb penalty that names `carb`.
fn penalty_for(carb: &str, matches: &[KeywordMatch]) -> Option<f64> {
    matches
        .iter()
        .filter(|m| m.kind == MatchKind::HighCarb && m.weight < 0.0)
        .find(|m| m.keyword.contains(carb) || carb.contains(m.keyword.as_str()))
        .map(|m| m.weight)
}
