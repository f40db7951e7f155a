//! Serde shapes of the five JSON dictionary sources.
//!
//! These mirror the files one-to-one and carry no behaviour; validation and
//! indexing happen in `KeywordDictionary::load`. Maps are `BTreeMap`s so the
//! discovery order of equally long keywords is stable across runs.

use std::collections::BTreeMap;

use serde::Deserialize;

pub(crate) type EntryMap = BTreeMap<String, EntrySchema>;

/// A keyword record. Every source shares this shape; fields a source does
/// not use are simply absent.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EntrySchema {
    pub weight: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub carb_base: Option<String>,
    #[serde(default)]
    pub replaces: Vec<String>,
    #[serde(default)]
    pub context_required: bool,
}

fn default_confidence() -> f64 {
    0.8
}

/// A named regex list with shared scoring fields.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PatternBlock {
    pub patterns: Vec<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub description: String,
}

/// `patterns` maps accept a bare list (group defaults apply) or a full block.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum PatternSpec {
    List(Vec<String>),
    Block(PatternBlock),
}

impl PatternSpec {
    pub fn into_block(self) -> PatternBlock {
        match self {
            PatternSpec::List(patterns) => {
                PatternBlock { patterns, weight: None, confidence: None, description: String::new() }
            }
            PatternSpec::Block(block) => block,
        }
    }
}

pub(crate) type HighCarbSchema = EntryMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct KetoFriendlySchema {
    #[serde(default)]
    pub cooking_methods: EntryMap,
    #[serde(flatten)]
    pub entries: EntryMap,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SubstitutionsSchema {
    #[serde(default)]
    pub complete_substitutions: EntryMap,
    #[serde(default)]
    pub keto_ingredients: EntryMap,
    #[serde(default)]
    pub patterns: BTreeMap<String, PatternSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct NegationsSchema {
    #[serde(default)]
    pub exclusion_patterns: Option<PatternBlock>,
    #[serde(default)]
    pub replacement_patterns: Option<PatternBlock>,
    #[serde(default)]
    pub negation_words: EntryMap,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MenuTypesSchema {
    #[serde(default)]
    pub low_score_types: EntryMap,
    #[serde(default)]
    pub combo_indicators: EntryMap,
    #[serde(default)]
    pub portion_indicators: EntryMap,
    #[serde(default)]
    pub korean_traditional: EntryMap,
    #[serde(default)]
    pub patterns: BTreeMap<String, PatternSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keto_friendly_folds_cooking_methods_out_of_the_flat_map() {
        let json = r#"{
            "연어": {"weight": 15, "confidence": 0.9},
            "cooking_methods": {"구이": {"weight": 10}}
        }"#;
        let parsed: KetoFriendlySchema = serde_json::from_str(json).unwrap();

        assert!(parsed.entries.contains_key("연어"));
        assert!(!parsed.entries.contains_key("cooking_methods"));
        assert_eq!(parsed.cooking_methods["구이"].confidence, 0.8);
    }

    #[test]
    fn pattern_spec_accepts_list_or_block() {
        let json = r#"{
            "a": ["x+"],
            "b": {"patterns": ["y+"], "weight": -10, "confidence": 0.75}
        }"#;
        let parsed: BTreeMap<String, PatternSpec> = serde_json::from_str(json).unwrap();

        let a = parsed["a"].clone().into_block();
        assert_eq!(a.patterns, vec!["x+"]);
        assert_eq!(a.weight, None);

        let b = parsed["b"].clone().into_block();
        assert_eq!(b.weight, Some(-10.0));
        assert_eq!(b.confidence, Some(0.75));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let json = r#"{"밥": {"weight": "heavy"}}"#;
        assert!(serde_json::from_str::<HighCarbSchema>(json).is_err());
    }
}
