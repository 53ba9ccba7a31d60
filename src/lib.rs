#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod lexicon;
mod params;
pub mod rules;
mod tables;
mod terms;

pub use api::{Analyzer, Context, EngineConfig, Options, ParseOutcome, ParseReport, ParseRequest};
pub use engine::{
    CacheStats, CancellationToken, ChildRole, DepthObserver, LayerContext, MorphRule, NodeId, ParentLink,
    Projection, RatingService, RuleId, RuleManager, RuleSet, RunMetrics, SandhiMatch, SandhiRule, SandhiRuleId,
    SolutionNode, SolutionTree, find_splits,
};
pub use error::{BundleError, EngineError, InitError, ParameterError, RatingError};
pub use lexicon::{FrequencySource, Lexicon, MemoryFrequencies, MemoryLexicon};
pub use params::{PARAMETER_COUNT, ParameterVector, PositionSet, UNSET, WILDCARD, matches};
pub use tables::{
    Bundle, FrequencyRecord, MorphRuleRecord, ProjectionRecord, RuleTables, SandhiGroupRecord, SandhiRuleRecord,
};
pub use terms::{Term, TermIndex, UNKNOWN_LABEL, UNSET_LABEL};

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Closed classifications -------------------------------------------------

/// Base classification of a morpheme, lexeme or derived form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseKind {
    Nominal,
    Pronominal,
    Verbal,
    Participial,
    Indeclinable,
    Compound,
    Stem,
    Affix,
    #[default]
    Unknown,
}

/// Branch-local failure recorded on a solution node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Not in the lexicon and no grammatical rule accepts the obligation.
    NoRuleMatched,
    /// Carried child parameters disagree with each other or with the rule output.
    ParameterConflict,
    /// Rules applied, but none of the proposed sandhi splits resolved on both sides.
    AmbiguousSplit,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NoRuleMatched => "no rule matched",
            ErrorKind::ParameterConflict => "parameter conflict",
            ErrorKind::AmbiguousSplit => "ambiguous split",
        };
        f.write_str(s)
    }
}

/// Which transformation a sandhi rule describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandhiDirection {
    /// `left + right -> joined`: verified by re-combining hypothesized constituents.
    Forward,
    /// `joined -> left + right`: the observed junction is expanded directly.
    Reverse,
}

/// A historical period scoping frequency statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChronologicalLayer(pub u32);

impl fmt::Display for ChronologicalLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

// --- Entries and solution content --------------------------------------------

/// A word-form: either an attested lexical item or a derived decomposition.
///
/// `left`/`right` are only ever present on virtual entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphEntry {
    pub id: u32,
    pub surface: String,
    pub parameters: ParameterVector,
    #[serde(default)]
    pub base: BaseKind,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<MorphEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<MorphEntry>>,
}

impl MorphEntry {
    /// An attested, terminal entry.
    pub fn lexical(
        id: u32,
        surface: impl Into<String>,
        parameters: ParameterVector,
        base: BaseKind,
        source: impl Into<String>,
    ) -> Self {
        MorphEntry {
            id,
            surface: surface.into(),
            parameters,
            base,
            is_virtual: false,
            source: source.into(),
            left: None,
            right: None,
        }
    }

    /// A derived decomposition. Derived entries are never in the dictionary, so their id is 0.
    pub fn derived(
        surface: impl Into<String>,
        parameters: ParameterVector,
        base: BaseKind,
        left: MorphEntry,
        right: MorphEntry,
    ) -> Self {
        MorphEntry {
            id: 0,
            surface: surface.into(),
            parameters,
            base,
            is_virtual: true,
            source: String::new(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Check the virtual/children invariant.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.is_virtual && !self.is_terminal() {
            return Err("non-virtual entry must not carry constituents");
        }
        if self.surface.is_empty() {
            return Err("surface must not be empty");
        }
        Ok(())
    }
}

/// Content of one candidate parse node.
///
/// Two contents with equal `(id, parameters, base, is_virtual)` are the same
/// solution for deduplication; `error` is informational.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionContent {
    /// Lexicon id, 0 when not in the dictionary.
    pub id: u32,
    pub parameters: ParameterVector,
    pub base: BaseKind,
    pub is_virtual: bool,
    pub error: Option<ErrorKind>,
}

impl SolutionContent {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_entries_are_terminal() {
        let e = MorphEntry::lexical(7, "gata", ParameterVector::wildcard(), BaseKind::Participial, "test");
        assert!(e.is_terminal());
        assert!(!e.is_virtual);
        assert!(e.validate().is_ok());
    }

    #[test]
    fn non_virtual_with_children_is_invalid() {
        let leaf = MorphEntry::lexical(1, "a", ParameterVector::wildcard(), BaseKind::Stem, "");
        let mut e = MorphEntry::derived("aa", ParameterVector::wildcard(), BaseKind::Compound, leaf.clone(), leaf);
        assert!(e.validate().is_ok());
        e.is_virtual = false;
        assert!(e.validate().is_err());
    }

    #[test]
    fn classifications_use_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&BaseKind::Indeclinable).unwrap(), "\"indeclinable\"");
        assert_eq!(serde_json::from_str::<SandhiDirection>("\"reverse\"").unwrap(), SandhiDirection::Reverse);
        assert_eq!(serde_json::to_string(&ChronologicalLayer(3)).unwrap(), "3");
    }
}
