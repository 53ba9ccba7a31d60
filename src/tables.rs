//! Loader-boundary records.
//!
//! These are the plain, already-deserialized shapes the engine accepts. They
//! carry no invariants of their own: [`crate::RuleSet::compile`],
//! [`crate::MemoryLexicon::new`] and [`crate::MemoryFrequencies::new`] do the
//! validation and refuse inconsistent data.
//!
//! [`Bundle`] is a convenience JSON container used by the CLI. The engine does
//! not depend on it.

use crate::error::BundleError;
use crate::params::ParameterVector;
use crate::terms::Term;
use crate::{BaseKind, ChronologicalLayer, MorphEntry, SandhiDirection};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleTables {
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub rules: Vec<MorphRuleRecord>,
    #[serde(default)]
    pub sandhi_groups: Vec<SandhiGroupRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorphRuleRecord {
    pub id: u32,
    pub label: String,
    #[serde(default)]
    pub pattern: ParameterVector,
    pub sandhi_group: String,
    #[serde(default)]
    pub base: BaseKind,
    #[serde(default = "default_virtual")]
    pub is_virtual: bool,
    /// Values the parent receives regardless of its children.
    #[serde(default)]
    pub output: ParameterVector,
    pub left: ProjectionRecord,
    pub right: ProjectionRecord,
}

fn default_virtual() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub label: String,
    #[serde(default)]
    pub parameters: ParameterVector,
    /// Positions whose child values are carried up into the parent.
    #[serde(default)]
    pub carry: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandhiGroupRecord {
    pub name: String,
    pub rules: Vec<SandhiRuleRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandhiRuleRecord {
    pub id: u32,
    pub direction: SandhiDirection,
    /// Tail of the left constituent.
    #[serde(default)]
    pub left: String,
    /// Head of the right constituent.
    #[serde(default)]
    pub right: String,
    /// What the junction looks like in the surface form.
    #[serde(default)]
    pub joined: String,
    /// Regex the left stem must end with.
    #[serde(default)]
    pub left_condition: Option<String>,
    /// Regex the right remainder must start with.
    #[serde(default)]
    pub right_condition: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyRecord {
    pub surface: String,
    pub layer: ChronologicalLayer,
    pub frequency: f64,
}

/// Rule tables, lexicon and frequency data in one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(flatten)]
    pub tables: RuleTables,
    #[serde(default)]
    pub lexicon: Vec<MorphEntry>,
    #[serde(default)]
    pub frequencies: Vec<FrequencyRecord>,
}

impl Bundle {
    pub fn from_json(text: &str) -> Result<Self, BundleError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_fills_defaults() {
        let json = r#"{
            "terms": [{ "id": 1, "label": "nom" }],
            "rules": [{
                "id": 1,
                "label": "phrase",
                "sandhi_group": "vowel",
                "left": { "label": "word" },
                "right": { "label": "word", "carry": [1] }
            }],
            "sandhi_groups": [{
                "name": "vowel",
                "rules": [{ "id": 1, "direction": "forward", "left": "a", "right": "i", "joined": "e" }]
            }],
            "lexicon": [{ "id": 4, "surface": "iti", "parameters": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0] }],
            "frequencies": [{ "surface": "iti", "layer": 1, "frequency": 12.0 }]
        }"#;

        let bundle = Bundle::from_json(json).unwrap();
        let rule = &bundle.tables.rules[0];
        assert!(rule.is_virtual);
        assert!(rule.pattern.is_wildcard());
        assert_eq!(rule.right.carry, vec![1]);
        assert_eq!(bundle.tables.sandhi_groups[0].rules[0].direction, SandhiDirection::Forward);
        assert!(!bundle.lexicon[0].is_virtual);
        assert_eq!(bundle.frequencies[0].layer, ChronologicalLayer(1));
    }

    #[test]
    fn short_parameter_vectors_are_rejected() {
        let json = r#"{ "lexicon": [{ "id": 4, "surface": "iti", "parameters": [0, 0] }] }"#;
        assert!(matches!(Bundle::from_json(json), Err(BundleError::Json(_))));
    }
}
