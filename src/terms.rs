//! Term dictionary: byte identifiers to grammatical labels and back.

use crate::error::InitError;
use crate::params::{ParameterVector, UNSET, WILDCARD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display label for the wildcard byte.
pub const UNKNOWN_LABEL: &str = "unknown";
/// Display label for the 255 sentinel.
pub const UNSET_LABEL: &str = "unset";

/// A named grammatical value assignable to one parameter position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: u8,
    pub label: String,
    #[serde(default)]
    pub alternate_label: Option<String>,
    #[serde(default)]
    pub alternate_property_label: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    by_id: HashMap<u8, Term>,
    by_label: HashMap<String, u8>,
}

impl TermIndex {
    pub fn new(terms: Vec<Term>) -> Result<Self, InitError> {
        let mut index = TermIndex::default();
        for term in terms {
            if term.id == WILDCARD || term.id == UNSET {
                return Err(InitError::ReservedTerm { id: term.id });
            }
            if term.label == UNKNOWN_LABEL || term.label == UNSET_LABEL || index.by_label.contains_key(&term.label) {
                return Err(InitError::DuplicateTermLabel { label: term.label });
            }
            if index.by_id.contains_key(&term.id) {
                return Err(InitError::DuplicateTerm { id: term.id });
            }
            index.by_label.insert(term.label.clone(), term.id);
            index.by_id.insert(term.id, term);
        }
        Ok(index)
    }

    /// The user-defined term for `id`. Always `None` for the sentinels.
    pub fn term(&self, id: u8) -> Option<&Term> {
        match id {
            WILDCARD | UNSET => None,
            _ => self.by_id.get(&id),
        }
    }

    /// Display label for `id`; the sentinels map to the reserved labels.
    pub fn label(&self, id: u8) -> Option<&str> {
        match id {
            WILDCARD => Some(UNKNOWN_LABEL),
            UNSET => Some(UNSET_LABEL),
            _ => self.by_id.get(&id).map(|t| t.label.as_str()),
        }
    }

    /// Reverse lookup by primary label.
    pub fn id_of(&self, label: &str) -> Option<u8> {
        match label {
            UNKNOWN_LABEL => Some(WILDCARD),
            UNSET_LABEL => Some(UNSET),
            _ => self.by_label.get(label).copied(),
        }
    }

    pub fn contains(&self, id: u8) -> bool {
        id == WILDCARD || id == UNSET || self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Render concrete positions as `pos:label` pairs, e.g. `1:nom 2:sg`.
    ///
    /// Unknown ids are rendered as `#id` so a report never hides a value.
    pub fn describe(&self, parameters: &ParameterVector) -> String {
        let parts: Vec<String> = parameters
            .as_bytes()
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b != WILDCARD)
            .map(|(i, &b)| match self.label(b) {
                Some(label) => format!("{i}:{label}"),
                None => format!("{i}:#{b}"),
            })
            .collect();
        if parts.is_empty() { "*".to_string() } else { parts.join(" ") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(id: u8, label: &str) -> Term {
        Term { id, label: label.to_string(), alternate_label: None, alternate_property_label: None }
    }

    #[test]
    fn sentinels_resolve_to_reserved_labels() {
        let index = TermIndex::new(vec![term(1, "nom")]).unwrap();
        assert_eq!(index.label(0), Some(UNKNOWN_LABEL));
        assert_eq!(index.label(255), Some(UNSET_LABEL));
        assert_eq!(index.term(0), None);
        assert_eq!(index.term(255), None);
        assert_eq!(index.label(1), Some("nom"));
        assert_eq!(index.id_of("nom"), Some(1));
        assert_eq!(index.id_of(UNSET_LABEL), Some(255));
        assert_eq!(index.label(9), None);
    }

    #[test]
    fn reserved_and_duplicate_ids_are_rejected() {
        assert!(matches!(TermIndex::new(vec![term(0, "x")]), Err(InitError::ReservedTerm { id: 0 })));
        assert!(matches!(TermIndex::new(vec![term(255, "x")]), Err(InitError::ReservedTerm { id: 255 })));
        assert!(matches!(
            TermIndex::new(vec![term(3, "a"), term(3, "b")]),
            Err(InitError::DuplicateTerm { id: 3 })
        ));
        assert!(matches!(
            TermIndex::new(vec![term(3, "a"), term(4, "a")]),
            Err(InitError::DuplicateTermLabel { .. })
        ));
    }

    #[test]
    fn describe_lists_concrete_positions() {
        let index = TermIndex::new(vec![term(10, "nom"), term(20, "sg")]).unwrap();
        let v = ParameterVector::wildcard().with(1, 10).unwrap().with(2, 20).unwrap().with(5, 77).unwrap();
        assert_eq!(index.describe(&v), "1:nom 2:sg 5:#77");
        assert_eq!(index.describe(&ParameterVector::wildcard()), "*");
    }
}
