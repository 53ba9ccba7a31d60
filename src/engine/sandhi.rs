//! Sandhi matcher: propose every phonetically valid split of a surface string.
//!
//! For an entry of `N` characters, every character position `1..N` (exclusive)
//! is a candidate boundary. At each boundary, each sandhi rule is tried:
//!
//! ```text
//! entry:    g a t e t i          rule (forward): a + i -> e
//!                 ^ boundary 3
//! stem   = "gat"        entry[..3]
//! joined = "e"          must sit at the boundary
//! rest   = "ti"         entry after the junction
//! left   = stem + "a"   = "gata"
//! right  = "i" + rest   = "iti"
//! ```
//!
//! - **Forward** rules describe `left + right -> joined`. The matcher
//!   hypothesizes constituents and keeps them only if re-applying the rule
//!   reproduces the observed entry.
//! - **Reverse** rules describe `joined -> left + right`. The matcher expands
//!   the observed junction directly.
//!
//! The matcher does not rank. Every accepted (boundary, rule) pair is returned,
//! ordered by boundary and then by rule order within the group. An empty result
//! is the normal "cannot decompose further" signal.

use super::compiled_rules::{SandhiRule, SandhiRuleId};
use crate::SandhiDirection;

/// One accepted split of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SandhiMatch {
    pub rule: SandhiRuleId,
    pub direction: SandhiDirection,
    /// Character index of the boundary in the original entry.
    pub boundary: usize,
    pub left: String,
    pub right: String,
}

impl SandhiRule {
    /// Apply the rule in its combining direction: strip the declared tail and
    /// head and insert the fused junction.
    pub fn combine(&self, left: &str, right: &str) -> Option<String> {
        let stem = left.strip_suffix(self.left.as_str())?;
        let rest = right.strip_prefix(self.right.as_str())?;
        Some(format!("{stem}{}{rest}", self.joined))
    }

    fn split_forward(&self, entry: &str, at: usize) -> Option<(String, String)> {
        let stem = &entry[..at];
        let rest = entry.get(at + self.joined.len()..)?;
        if !self.accepts_context(stem, rest) {
            return None;
        }
        let left = format!("{stem}{}", self.left);
        let right = format!("{}{rest}", self.right);
        if right.is_empty() {
            return None;
        }
        (self.combine(&left, &right)? == entry).then_some((left, right))
    }

    fn split_reverse(&self, entry: &str, at: usize) -> Option<(String, String)> {
        let stem = &entry[..at];
        let rest = entry[at..].strip_prefix(self.joined.as_str())?;
        if !self.accepts_context(stem, rest) {
            return None;
        }
        let right = format!("{}{rest}", self.right);
        if right.is_empty() {
            return None;
        }
        Some((format!("{stem}{}", self.left), right))
    }
}

/// Find every split of `entry` accepted by any of `rules`.
pub fn find_splits(entry: &str, rules: &[SandhiRule]) -> Vec<SandhiMatch> {
    let mut found = Vec::new();

    for (boundary, (at, _)) in entry.char_indices().enumerate().skip(1) {
        for rule in rules {
            let split = match rule.direction {
                SandhiDirection::Forward => rule.split_forward(entry, at),
                SandhiDirection::Reverse => rule.split_reverse(entry, at),
            };
            if let Some((left, right)) = split {
                found.push(SandhiMatch { rule: rule.id, direction: rule.direction, boundary, left, right });
            }
        }
    }

    found
}
