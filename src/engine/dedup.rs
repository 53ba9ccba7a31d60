//! Deduplication keys for alternative solutions.
//!
//! Different derivation paths regularly arrive at the same analysis: two
//! sandhi rules proposing the same constituents, or two grammatical rules
//! with the same output. Alternatives are collapsed by [`SolutionKey`]:
//!
//! - lexicon id (`0` for derived forms)
//! - parameter vector
//! - base classification
//! - virtual flag
//!
//! The error code, surface string and producing rule are *not* part of the
//! key. When two alternatives collide the higher-rated one survives; on equal
//! ratings the earlier one does, which keeps output independent of worker
//! interleaving once candidates are collected in a fixed order.

use super::tree::Candidate;
use crate::params::ParameterVector;
use crate::{BaseKind, SolutionContent};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SolutionKey {
    pub(crate) id: u32,
    pub(crate) parameters: ParameterVector,
    pub(crate) base: BaseKind,
    pub(crate) is_virtual: bool,
}

impl SolutionKey {
    pub(crate) fn from_content(content: &SolutionContent) -> Self {
        SolutionKey {
            id: content.id,
            parameters: content.parameters,
            base: content.base,
            is_virtual: content.is_virtual,
        }
    }
}

/// Collapse alternatives with equal keys, keeping the highest-rated instance
/// in the position where its key first appeared.
pub(crate) fn dedup_keep_best(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut slots: HashMap<SolutionKey, usize> = HashMap::with_capacity(candidates.len());
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = SolutionKey::from_content(&candidate.content);
        match slots.get(&key) {
            Some(&slot) => {
                if candidate.rating > kept[slot].rating {
                    kept[slot] = candidate;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(candidate);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(surface: &str, parameters: ParameterVector, rating: f64) -> Candidate {
        Candidate::leaf(
            surface,
            "word",
            SolutionContent { id: 0, parameters, base: BaseKind::Compound, is_virtual: true, error: None },
            rating,
        )
    }

    #[test]
    fn equal_content_keeps_higher_rating() {
        let out = dedup_keep_best(vec![
            candidate("first", params![1 => 10], 0.5),
            candidate("other", params![1 => 11], 0.7),
            candidate("second", params![1 => 10], 0.9),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].surface, "second");
        assert_eq!(out[0].rating, 0.9);
        assert_eq!(out[1].surface, "other");
    }

    #[test]
    fn ties_keep_the_earlier_instance() {
        let out = dedup_keep_best(vec![candidate("a", params![], 1.0), candidate("b", params![], 1.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].surface, "a");
    }

    #[test]
    fn virtual_flag_and_base_distinguish_content() {
        let mut lexical = candidate("a", params![], 1.0);
        lexical.content.is_virtual = false;
        let mut verbal = candidate("a", params![], 1.0);
        verbal.content.base = BaseKind::Verbal;
        let out = dedup_keep_best(vec![candidate("a", params![], 1.0), lexical, verbal]);
        assert_eq!(out.len(), 3);
    }
}
