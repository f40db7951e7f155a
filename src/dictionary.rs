//! Keyword dictionary: loading, validation and indexing.
//!
//! All five sources are folded into one immutable structure at startup:
//!
//! ```text
//! high_carb.json ──┐
//! keto_friendly ───┤  parse (schema.rs)     entries: Vec<(MatchKind, KeywordEntry)>
//! substitutions ───┼─ validate          ──▶ lookup:  surface form ─▶ entry (longest first)
//! negations ───────┤  compile regexes       groups:  Vec<PatternGroup>
//! menu_types ──────┘
//! ```
//!
//! The dictionary is never mutated after `load` returns, so a single
//! `Arc<KeywordDictionary>` can be shared by any number of scoring threads.

#[path = "dictionary/schema.rs"]
mod schema;
#[path = "dictionary/sources.rs"]
mod sources;

pub use sources::{DICTIONARY_DIR_ENV, DictionarySource, DictionarySources};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{ConfigError, MatchKind};
use schema::{
    EntryMap, EntrySchema, HighCarbSchema, KetoFriendlySchema, MenuTypesSchema, NegationsSchema, PatternBlock,
    SubstitutionsSchema,
};

const BOUNDARY_WEIGHT: f64 = -12.0;
const BOUNDARY_CONFIDENCE: f64 = 0.85;
const MENU_TYPE_WEIGHT: f64 = -6.0;
const MENU_TYPE_CONFIDENCE: f64 = 0.7;
const SUBSTITUTION_PATTERN_WEIGHT: f64 = 10.0;
const SUBSTITUTION_PATTERN_CONFIDENCE: f64 = 0.8;
const NEGATION_PATTERN_WEIGHT: f64 = 10.0;
const NEGATION_PATTERN_CONFIDENCE: f64 = 0.8;
const MENU_TYPE_PREFIX: &str = "menu_type_";

static BUILTIN: OnceCell<Arc<KeywordDictionary>> = OnceCell::new();

/// The process-wide builtin dictionary, loaded on first use.
pub fn builtin_dictionary() -> Result<Arc<KeywordDictionary>, ConfigError> {
    BUILTIN.get_or_try_init(|| KeywordDictionary::builtin().map(Arc::new)).cloned()
}

/// A dictionary record. Aliases resolve to the same record.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordEntry {
    pub keyword: String,
    pub weight: f64,
    pub confidence: f64,
    pub aliases: Vec<String>,
    pub description: String,
    /// Staple carbohydrate this record concerns, e.g. `"rice"`.
    pub carb_base: Option<String>,
    /// Carb keywords a substitute stands in for.
    pub replaces: Vec<String>,
    /// Only valid when a carbohydrate term is nearby (bare negation words).
    pub context_required: bool,
}

impl KeywordEntry {
    /// Canonical keyword followed by aliases.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.keyword.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Regex families. Closed so matching never dispatches on group names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Exclusion,
    Replacement,
    BoundaryHighCarb,
    Substitution,
    MenuType,
}

impl PatternKind {
    pub fn match_kind(self) -> MatchKind {
        match self {
            PatternKind::Exclusion | PatternKind::Replacement => MatchKind::Negation,
            PatternKind::BoundaryHighCarb => MatchKind::HighCarb,
            PatternKind::Substitution => MatchKind::Substitution,
            PatternKind::MenuType => MatchKind::MenuType,
        }
    }
}

/// Compiled regexes sharing one weight and confidence.
#[derive(Debug, Clone)]
pub struct PatternGroup {
    pub kind: PatternKind,
    pub name: String,
    pub regexes: Vec<Regex>,
    pub weight: f64,
    pub confidence: f64,
    pub description: String,
}

/// A surface form pointing at its entry.
#[derive(Debug, Clone)]
pub(crate) struct LookupKey {
    pub surface: String,
    pub kind: MatchKind,
    pub entry: usize,
}

/// Immutable keyword index built from the dictionary sources.
#[derive(Debug, Clone)]
pub struct KeywordDictionary {
    entries: Vec<(MatchKind, KeywordEntry)>,
    lookup: Vec<LookupKey>,
    by_surface: HashMap<String, usize>,
    groups: Vec<PatternGroup>,
}

impl KeywordDictionary {
    /// Parse, validate and index `sources`.
    ///
    /// Absent sources contribute nothing. A present source that does not
    /// match its schema fails with a [`ConfigError`] naming the source.
    pub fn load(sources: &DictionarySources) -> Result<Self, ConfigError> {
        let mut builder = Builder::default();

        if let Some(high_carb) = parse::<HighCarbSchema>(sources, DictionarySource::HighCarb)? {
            builder.add_entries(DictionarySource::HighCarb, MatchKind::HighCarb, high_carb, Sign::Negative)?;
        }

        if let Some(keto) = parse::<KetoFriendlySchema>(sources, DictionarySource::KetoFriendly)? {
            builder.add_entries(DictionarySource::KetoFriendly, MatchKind::KetoFriendly, keto.entries, Sign::Positive)?;
            builder.add_entries(
                DictionarySource::KetoFriendly,
                MatchKind::KetoFriendly,
                keto.cooking_methods,
                Sign::Positive,
            )?;
        }

        if let Some(subs) = parse::<SubstitutionsSchema>(sources, DictionarySource::Substitutions)? {
            let source = DictionarySource::Substitutions;
            builder.add_entries(source, MatchKind::Substitution, subs.complete_substitutions, Sign::Any)?;
            builder.add_entries(source, MatchKind::Substitution, subs.keto_ingredients, Sign::Any)?;
            for (name, spec) in subs.patterns {
                let defaults = (SUBSTITUTION_PATTERN_WEIGHT, SUBSTITUTION_PATTERN_CONFIDENCE);
                builder.add_group(source, PatternKind::Substitution, name, spec.into_block(), defaults)?;
            }
        }

        if let Some(negations) = parse::<NegationsSchema>(sources, DictionarySource::Negations)? {
            let source = DictionarySource::Negations;
            let defaults = (NEGATION_PATTERN_WEIGHT, NEGATION_PATTERN_CONFIDENCE);
            if let Some(block) = negations.exclusion_patterns {
                builder.add_group(source, PatternKind::Exclusion, "negation_patterns".to_string(), block, defaults)?;
            }
            if let Some(block) = negations.replacement_patterns {
                builder.add_group(
                    source,
                    PatternKind::Replacement,
                    "replacement_patterns".to_string(),
                    block,
                    defaults,
                )?;
            }
            builder.add_entries(source, MatchKind::Negation, negations.negation_words, Sign::Any)?;
        }

        if let Some(menu) = parse::<MenuTypesSchema>(sources, DictionarySource::MenuTypes)? {
            let source = DictionarySource::MenuTypes;
            for map in [menu.low_score_types, menu.combo_indicators, menu.portion_indicators, menu.korean_traditional]
            {
                builder.add_entries(source, MatchKind::MenuType, map, Sign::Any)?;
            }
            for (name, spec) in menu.patterns {
                let name = if name.starts_with(MENU_TYPE_PREFIX) { name } else { format!("{MENU_TYPE_PREFIX}{name}") };
                let defaults = (MENU_TYPE_WEIGHT, MENU_TYPE_CONFIDENCE);
                builder.add_group(source, PatternKind::MenuType, name, spec.into_block(), defaults)?;
            }
        }

        builder.add_boundary_group();
        let dictionary = builder.finish();

        info!(
            entries = dictionary.entries.len(),
            surface_forms = dictionary.lookup.len(),
            pattern_groups = dictionary.groups.len(),
            "keyword dictionary loaded"
        );
        Ok(dictionary)
    }

    /// Load the dictionary compiled into the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::load(&DictionarySources::builtin())
    }

    /// Load `<dir>/<source>.json` for each source.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(&DictionarySources::from_dir(dir)?)
    }

    /// Look up a surface form (keyword or alias), case-insensitively.
    pub fn get(&self, surface: &str) -> Option<(MatchKind, &KeywordEntry)> {
        let key = self.by_surface.get(&surface.to_lowercase())?;
        let lookup = &self.lookup[*key];
        let (kind, entry) = &self.entries[lookup.entry];
        debug_assert_eq!(*kind, lookup.kind);
        Some((*kind, entry))
    }

    /// All entries of one kind, in load order.
    pub fn entries(&self, kind: MatchKind) -> impl Iterator<Item = &KeywordEntry> {
        self.entries.iter().filter(move |(k, _)| *k == kind).map(|(_, entry)| entry)
    }

    pub fn pattern_groups(&self) -> &[PatternGroup] {
        &self.groups
    }

    /// Number of distinct entries (aliases not counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn lookup_keys(&self) -> &[LookupKey] {
        &self.lookup
    }

    pub(crate) fn entry(&self, index: usize) -> &KeywordEntry {
        &self.entries[index].1
    }
}

fn parse<T: DeserializeOwned>(
    sources: &DictionarySources,
    source: DictionarySource,
) -> Result<Option<T>, ConfigError> {
    let Some(text) = sources.get(source) else {
        debug!(source = source.name(), "dictionary source absent");
        return Ok(None);
    };
    serde_json::from_str(text)
        .map(Some)
        .map_err(|err| ConfigError::Malformed { source_name: source.name(), source: err })
}

#[derive(Debug, Clone, Copy)]
enum Sign {
    Negative,
    Positive,
    Any,
}

#[derive(Default)]
struct Builder {
    entries: Vec<(MatchKind, KeywordEntry)>,
    lookup: Vec<LookupKey>,
    groups: Vec<PatternGroup>,
    seen: HashMap<String, MatchKind>,
}

impl Builder {
    fn add_entries(
        &mut self,
        source: DictionarySource,
        kind: MatchKind,
        map: EntryMap,
        sign: Sign,
    ) -> Result<(), ConfigError> {
        for (keyword, schema) in map {
            validate_entry(source, &keyword, &schema, sign)?;
            let entry = KeywordEntry {
                keyword: keyword.to_lowercase(),
                weight: schema.weight,
                confidence: schema.confidence,
                aliases: schema.aliases.iter().map(|a| a.to_lowercase()).collect(),
                description: schema.description,
                carb_base: schema.carb_base,
                replaces: schema.replaces.iter().map(|r| r.to_lowercase()).collect(),
                context_required: schema.context_required,
            };

            let index = self.entries.len();
            for surface in entry.surface_forms() {
                if surface.trim().is_empty() {
                    continue;
                }
                if let Some(existing) = self.seen.get(surface) {
                    debug!(surface, kept = existing.as_str(), dropped = kind.as_str(), "duplicate surface form");
                    continue;
                }
                self.seen.insert(surface.to_string(), kind);
                self.lookup.push(LookupKey { surface: surface.to_string(), kind, entry: index });
            }
            self.entries.push((kind, entry));
        }
        Ok(())
    }

    fn add_group(
        &mut self,
        source: DictionarySource,
        kind: PatternKind,
        name: String,
        block: PatternBlock,
        (default_weight, default_confidence): (f64, f64),
    ) -> Result<(), ConfigError> {
        let weight = block.weight.unwrap_or(default_weight);
        let confidence = block.confidence.unwrap_or(default_confidence);
        if !weight.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(ConfigError::InvalidEntry {
                source_name: source.name(),
                keyword: name,
                reason: format!("weight {weight} / confidence {confidence} out of range"),
            });
        }

        let regexes = block
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|err| ConfigError::InvalidPattern {
                    source_name: source.name(),
                    pattern: pattern.clone(),
                    source: err,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.groups.push(PatternGroup { kind, name, regexes, weight, confidence, description: block.description });
        Ok(())
    }

    fn add_boundary_group(&mut self) {
        let regex = regex!(concat!(r"\b", carb_terms!(), r"\b")).clone();
        self.groups.push(PatternGroup {
            kind: PatternKind::BoundaryHighCarb,
            name: "boundary_high_carb".to_string(),
            regexes: vec![regex],
            weight: BOUNDARY_WEIGHT,
            confidence: BOUNDARY_CONFIDENCE,
            description: "standalone staple carbohydrate".to_string(),
        });
    }

    fn finish(mut self) -> KeywordDictionary {
        // Longest surface first; stable, so equal lengths keep source order.
        self.lookup.sort_by(|a, b| b.surface.chars().count().cmp(&a.surface.chars().count()));
        let by_surface = self.lookup.iter().enumerate().map(|(i, key)| (key.surface.clone(), i)).collect();
        KeywordDictionary { entries: self.entries, lookup: self.lookup, by_surface, groups: self.groups }
    }
}

fn validate_entry(
    source: DictionarySource,
    keyword: &str,
    schema: &EntrySchema,
    sign: Sign,
) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEntry {
        source_name: source.name(),
        keyword: keyword.to_string(),
        reason,
    };

    if keyword.trim().is_empty() {
        return Err(invalid("keyword is empty".to_string()));
    }
    if !schema.weight.is_finite() {
        return Err(invalid(format!("weight {} is not finite", schema.weight)));
    }
    if !(0.0..=1.0).contains(&schema.confidence) {
        return Err(invalid(format!("confidence {} is outside 0..=1", schema.confidence)));
    }
    match sign {
        Sign::Negative if schema.weight >= 0.0 => Err(invalid(format!("weight {} must be negative", schema.weight))),
        Sign::Positive if schema.weight <= 0.0 => Err(invalid(format!("weight {} must be positive", schema.weight))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dictionary_loads_every_kind() {
        let dict = KeywordDictionary::builtin().unwrap();

        for kind in [
            MatchKind::HighCarb,
            MatchKind::KetoFriendly,
            MatchKind::Substitution,
            MatchKind::Negation,
            MatchKind::MenuType,
        ] {
            assert!(dict.entries(kind).next().is_some(), "no {} entries", kind.as_str());
        }
    }

    #[test]
    fn aliases_resolve_to_their_entry() {
        let dict = KeywordDictionary::builtin().unwrap();

        let (kind, entry) = dict.get("공기밥").unwrap();
        assert_eq!(kind, MatchKind::HighCarb);
        assert_eq!(entry.keyword, "밥");
        assert_eq!(entry.carb_base.as_deref(), Some("rice"));

        let (kind, entry) = dict.get("Konjac Rice").unwrap();
        assert_eq!(kind, MatchKind::Substitution);
        assert!(entry.replaces.iter().any(|r| r == "밥"));
    }

    #[test]
    fn cooking_methods_fold_into_keto_friendly() {
        let dict = KeywordDictionary::builtin().unwrap();
        let (kind, _) = dict.get("구이").unwrap();
        assert_eq!(kind, MatchKind::KetoFriendly);
    }

    #[test]
    fn lookup_keys_are_longest_first() {
        let dict = KeywordDictionary::builtin().unwrap();
        let lengths: Vec<usize> = dict.lookup_keys().iter().map(|k| k.surface.chars().count()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn menu_type_pattern_groups_are_prefixed() {
        let dict = KeywordDictionary::builtin().unwrap();
        let names: Vec<&str> = dict
            .pattern_groups()
            .iter()
            .filter(|g| g.kind == PatternKind::MenuType)
            .map(|g| g.name.as_str())
            .collect();

        assert!(names.contains(&"menu_type_set_for_people"));
        assert!(names.contains(&"menu_type_sweets"));
        let sweets = dict.pattern_groups().iter().find(|g| g.name == "menu_type_sweets").unwrap();
        assert_eq!(sweets.weight, -10.0);
        let people = dict.pattern_groups().iter().find(|g| g.name == "menu_type_set_for_people").unwrap();
        assert_eq!(people.weight, -6.0);
        assert_eq!(people.confidence, 0.7);
    }

    #[test]
    fn empty_sources_still_have_boundary_group() {
        let dict = KeywordDictionary::load(&DictionarySources::empty()).unwrap();
        assert!(dict.is_empty());
        assert_eq!(dict.pattern_groups().len(), 1);
        assert_eq!(dict.pattern_groups()[0].kind, PatternKind::BoundaryHighCarb);
    }

    #[test]
    fn missing_source_degrades_to_no_entries() {
        let sources = DictionarySources::builtin().without(DictionarySource::MenuTypes);
        let dict = KeywordDictionary::load(&sources).unwrap();
        assert_eq!(dict.entries(MatchKind::MenuType).count(), 0);
        assert!(dict.entries(MatchKind::HighCarb).count() > 0);
    }

    #[test]
    fn malformed_source_names_the_source() {
        let sources = DictionarySources::builtin().with(DictionarySource::Negations, r#"{"negation_words": []}"#);
        let err = KeywordDictionary::load(&sources).unwrap_err();
        match err {
            ConfigError::Malformed { source_name, .. } => assert_eq!(source_name, "negations"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn positive_high_carb_weight_is_rejected() {
        let sources = DictionarySources::empty().with(DictionarySource::HighCarb, r#"{"밥": {"weight": 5}}"#);
        let err = KeywordDictionary::load(&sources).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEntry { source_name: "high_carb", .. }));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let sources = DictionarySources::empty().with(DictionarySource::MenuTypes, r#"{"patterns": {"bad": ["(unclosed"]}}"#);
        let err = KeywordDictionary::load(&sources).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { source_name: "menu_types", .. }));
    }

    #[test]
    fn builtin_dictionary_is_shared() {
        let a = builtin_dictionary().unwrap();
        let b = builtin_dictionary().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
