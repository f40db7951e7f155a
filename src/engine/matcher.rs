//! Keyword matching over menu text.
//!
//! ```text
//! lower-cased text
//!   ├─ literal pass   every surface form, longest first, first occurrence only
//!   │                 (negation words need a carb term within ±20 chars)
//!   ├─ pattern pass   every compiled regex group, every occurrence
//!   └─ dedup          drop matches within 3 chars of a kept one, sort by position
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use super::dedup::dedup_by_position;
use super::text::CharText;
use crate::{KeywordDictionary, KeywordMatch, MatchKind};

/// Chars either side of a match copied into `KeywordMatch::context`.
const CONTEXT_RADIUS: usize = 10;
/// Chars either side of a context-required negation word searched for a carb.
const CARB_CONTEXT_RADIUS: usize = 20;

/// Carb terms that validate a bare negation word like "제외" or "without".
const CONTEXT_CARBS: &[&str] = &[
    "밥", "면", "국수", "라면", "빵", "떡", "파스타", "rice", "noodle", "ramen", "bread", "pasta", "bun",
];

/// Finds dictionary keywords and pattern hits in free text.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    dictionary: Arc<KeywordDictionary>,
}

impl KeywordMatcher {
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        Self { dictionary }
    }

    /// Ordered, de-duplicated matches for `text`. The text is lower-cased first.
    pub fn find_matches(&self, text: &str) -> Vec<KeywordMatch> {
        let lower = text.to_lowercase();
        let text = CharText::new(&lower);

        let mut found = Vec::new();
        self.literal_matches(&text, &mut found);
        self.pattern_matches(&text, &mut found);
        let discovered = found.len();

        let matches = dedup_by_position(found);
        debug!(discovered, kept = matches.len(), "keyword matching finished");
        matches
    }

    fn literal_matches(&self, text: &CharText<'_>, found: &mut Vec<KeywordMatch>) {
        for key in self.dictionary.lookup_keys() {
            let Some(position) = text.find(&key.surface) else {
                continue;
            };
            let entry = self.dictionary.entry(key.entry);

            if entry.context_required && !has_carb_nearby(text, position) {
                trace!(keyword = %key.surface, position, "negation word without nearby carb, discarded");
                continue;
            }

            found.push(KeywordMatch {
                keyword: key.surface.clone(),
                kind: key.kind,
                weight: entry.weight,
                confidence: entry.confidence,
                position,
                context: text.window(position, CONTEXT_RADIUS).to_string(),
            });
        }
    }

    fn pattern_matches(&self, text: &CharText<'_>, found: &mut Vec<KeywordMatch>) {
        for group in self.dictionary.pattern_groups() {
            let kind: MatchKind = group.kind.match_kind();
            for regex in &group.regexes {
                for hit in regex.find_iter(text.as_str()) {
                    let position = text.char_at(hit.start());
                    trace!(group = %group.name, keyword = hit.as_str(), position, "pattern hit");
                    found.push(KeywordMatch {
                        keyword: hit.as_str().to_string(),
                        kind,
                        weight: group.weight,
                        confidence: group.confidence,
                        position,
                        context: text.window(position, CONTEXT_RADIUS).to_string(),
                    });
                }
            }
        }
    }
}

fn has_carb_nearby(text: &CharText<'_>, position: usize) -> bool {
    let window = text.window(position, CARB_CONTEXT_RADIUS);
    CONTEXT_CARBS.iter().any(|carb| window.contains(carb))
}
