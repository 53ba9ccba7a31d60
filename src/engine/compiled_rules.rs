//! Rule compilation and indexing.
//!
//! This module holds the *static* side of the engine: the validated,
//! read-only structures derived from the loader's [`RuleTables`].
//!
//! Parsing is split into two phases:
//!
//! 1. **Compile/index** (this module): validate the term dictionary, the
//!    grammatical rules and the sandhi groups, then index rules by label and
//!    sandhi rules by group name.
//! 2. **Run** (see `parser.rs`): recursively decompose an entry, asking the
//!    rule manager (`rule_manager.rs`) for memoized rule and split lookups.
//!
//! A compiled [`RuleSet`] is immutable. Nothing in the engine mutates it after
//! `compile` returns, so it is shared behind an `Arc` by every parse.
//!
//! ## Invariants
//!
//! - Rule ids, term ids and sandhi rule ids are unique.
//! - Every concrete byte in a rule's pattern, output and projections names a
//!   known term (or one of the sentinels).
//! - Every rule references an existing sandhi group.
//! - `by_label` holds indexes into `rules`, in table order.

use crate::error::InitError;
use crate::params::{ParameterVector, PositionSet};
use crate::tables::{MorphRuleRecord, ProjectionRecord, RuleTables, SandhiRuleRecord};
use crate::terms::TermIndex;
use crate::{BaseKind, SandhiDirection};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SandhiRuleId(pub u32);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for SandhiRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// What a rule asks of one child, and what it takes back from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub label: String,
    pub parameters: ParameterVector,
    pub carry: PositionSet,
}

/// A grammatical decomposition rule.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphRule {
    pub id: RuleId,
    pub label: String,
    pub pattern: ParameterVector,
    pub sandhi_group: String,
    pub base: BaseKind,
    pub is_virtual: bool,
    pub output: ParameterVector,
    pub left: Projection,
    pub right: Projection,
}

/// A phonetic junction rule.
///
/// `left` is the tail of the left constituent, `right` the head of the right
/// constituent and `joined` their fused surface form.
#[derive(Debug, Clone)]
pub struct SandhiRule {
    pub id: SandhiRuleId,
    pub direction: SandhiDirection,
    pub left: String,
    pub right: String,
    pub joined: String,
    left_condition: Option<Regex>,
    right_condition: Option<Regex>,
}

impl SandhiRule {
    pub fn new(
        id: SandhiRuleId,
        direction: SandhiDirection,
        left: impl Into<String>,
        right: impl Into<String>,
        joined: impl Into<String>,
    ) -> Self {
        SandhiRule {
            id,
            direction,
            left: left.into(),
            right: right.into(),
            joined: joined.into(),
            left_condition: None,
            right_condition: None,
        }
    }

    fn from_record(record: SandhiRuleRecord) -> Result<Self, InitError> {
        let compile = |pattern: Option<String>, anchor: fn(&str) -> String| {
            pattern
                .map(|p| Regex::new(&anchor(&p)))
                .transpose()
                .map_err(|source| InitError::InvalidCondition { rule: record.id, source })
        };
        let left_condition = compile(record.left_condition, |p| format!("(?:{p})$"))?;
        let right_condition = compile(record.right_condition, |p| format!("^(?:{p})"))?;

        Ok(SandhiRule {
            id: SandhiRuleId(record.id),
            direction: record.direction,
            left: record.left,
            right: record.right,
            joined: record.joined,
            left_condition,
            right_condition,
        })
    }

    /// Check the optional context conditions against the stem left of the
    /// junction and the remainder right of it.
    pub fn accepts_context(&self, left_stem: &str, right_rest: &str) -> bool {
        self.left_condition.as_ref().is_none_or(|re| re.is_match(left_stem))
            && self.right_condition.as_ref().is_none_or(|re| re.is_match(right_rest))
    }
}

impl PartialEq for SandhiRule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.direction == other.direction
            && self.left == other.left
            && self.right == other.right
            && self.joined == other.joined
            && self.left_condition.as_ref().map(Regex::as_str) == other.left_condition.as_ref().map(Regex::as_str)
            && self.right_condition.as_ref().map(Regex::as_str) == other.right_condition.as_ref().map(Regex::as_str)
    }
}

/// Validated, indexed rule tables.
#[derive(Debug)]
pub struct RuleSet {
    terms: TermIndex,
    rules: Vec<Arc<MorphRule>>,
    by_label: HashMap<String, Vec<usize>>,
    sandhi: HashMap<String, Arc<[SandhiRule]>>,
}

impl RuleSet {
    /// Validate and index `tables`. Any inconsistency refuses the whole set.
    pub fn compile(tables: RuleTables) -> Result<Self, InitError> {
        let terms = TermIndex::new(tables.terms)?;

        let mut sandhi: HashMap<String, Arc<[SandhiRule]>> = HashMap::new();
        let mut sandhi_ids = HashSet::new();
        for group in tables.sandhi_groups {
            if sandhi.contains_key(&group.name) {
                return Err(InitError::DuplicateSandhiGroup { group: group.name });
            }
            let mut compiled = Vec::with_capacity(group.rules.len());
            for record in group.rules {
                if !sandhi_ids.insert(record.id) {
                    return Err(InitError::DuplicateSandhiRule { id: record.id });
                }
                compiled.push(SandhiRule::from_record(record)?);
            }
            sandhi.insert(group.name, compiled.into());
        }

        let mut rules = Vec::with_capacity(tables.rules.len());
        let mut by_label: HashMap<String, Vec<usize>> = HashMap::new();
        let mut rule_ids = HashSet::new();
        for record in tables.rules {
            if !rule_ids.insert(record.id) {
                return Err(InitError::DuplicateRule { id: record.id });
            }
            let rule = compile_rule(record, &terms, &sandhi)?;
            by_label.entry(rule.label.clone()).or_default().push(rules.len());
            rules.push(Arc::new(rule));
        }

        tracing::debug!(
            rules = rules.len(),
            labels = by_label.len(),
            sandhi_groups = sandhi.len(),
            terms = terms.len(),
            "compiled rule set"
        );

        Ok(RuleSet { terms, rules, by_label, sandhi })
    }

    pub fn terms(&self) -> &TermIndex {
        &self.terms
    }

    pub fn rules(&self) -> &[Arc<MorphRule>] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> Option<&Arc<MorphRule>> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Rules carrying `label`, in table order.
    pub fn rules_labelled<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a Arc<MorphRule>> + 'a {
        self.by_label.get(label).into_iter().flatten().map(move |&i| &self.rules[i])
    }

    pub fn sandhi_group(&self, name: &str) -> Option<&Arc<[SandhiRule]>> {
        self.sandhi.get(name)
    }
}

fn compile_rule(
    record: MorphRuleRecord,
    terms: &TermIndex,
    sandhi: &HashMap<String, Arc<[SandhiRule]>>,
) -> Result<MorphRule, InitError> {
    let id = record.id;
    check_label(id, &record.label)?;
    if !sandhi.contains_key(&record.sandhi_group) {
        return Err(InitError::UnknownSandhiGroup { rule: id, group: record.sandhi_group });
    }
    check_terms(id, &record.pattern, terms)?;
    check_terms(id, &record.output, terms)?;

    let left = compile_projection(id, record.left, terms)?;
    let right = compile_projection(id, record.right, terms)?;

    Ok(MorphRule {
        id: RuleId(id),
        label: record.label,
        pattern: record.pattern,
        sandhi_group: record.sandhi_group,
        base: record.base,
        is_virtual: record.is_virtual,
        output: record.output,
        left,
        right,
    })
}

fn compile_projection(rule: u32, record: ProjectionRecord, terms: &TermIndex) -> Result<Projection, InitError> {
    check_label(rule, &record.label)?;
    check_terms(rule, &record.parameters, terms)?;
    let carry = PositionSet::from_positions(record.carry)?;
    Ok(Projection { label: record.label, parameters: record.parameters, carry })
}

fn check_label(rule: u32, label: &str) -> Result<(), InitError> {
    if regex!(r"^[\p{L}\p{N}_.:-]+$").is_match(label) {
        Ok(())
    } else {
        Err(InitError::InvalidLabel { rule, label: label.to_string() })
    }
}

fn check_terms(rule: u32, parameters: &ParameterVector, terms: &TermIndex) -> Result<(), InitError> {
    match parameters.as_bytes().iter().enumerate().find(|&(_, &b)| !terms.contains(b)) {
        Some((position, &term)) => Err(InitError::UnknownTerm { rule, position, term }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::SandhiGroupRecord;
    use crate::terms::Term;

    fn projection(label: &str) -> ProjectionRecord {
        ProjectionRecord { label: label.to_string(), parameters: ParameterVector::wildcard(), carry: vec![] }
    }

    fn rule(id: u32, label: &str, group: &str) -> MorphRuleRecord {
        MorphRuleRecord {
            id,
            label: label.to_string(),
            pattern: ParameterVector::wildcard(),
            sandhi_group: group.to_string(),
            base: BaseKind::Compound,
            is_virtual: true,
            output: ParameterVector::wildcard(),
            left: projection("word"),
            right: projection("word"),
        }
    }

    fn sandhi(id: u32, condition: Option<&str>) -> SandhiRuleRecord {
        SandhiRuleRecord {
            id,
            direction: SandhiDirection::Forward,
            left: "a".into(),
            right: "i".into(),
            joined: "e".into(),
            left_condition: condition.map(str::to_string),
            right_condition: None,
        }
    }

    fn tables(rules: Vec<MorphRuleRecord>) -> RuleTables {
        RuleTables {
            terms: vec![Term { id: 10, label: "nom".into(), alternate_label: None, alternate_property_label: None }],
            rules,
            sandhi_groups: vec![SandhiGroupRecord { name: "vowel".into(), rules: vec![sandhi(1, None)] }],
        }
    }

    #[test]
    fn indexes_rules_by_label_in_table_order() {
        let set = RuleSet::compile(tables(vec![rule(2, "phrase", "vowel"), rule(1, "word", "vowel"), rule(3, "phrase", "vowel")]))
            .unwrap();
        let ids: Vec<RuleId> = set.rules_labelled("phrase").map(|r| r.id).collect();
        assert_eq!(ids, vec![RuleId(2), RuleId(3)]);
        assert_eq!(set.rules_labelled("missing").count(), 0);
        assert_eq!(set.sandhi_group("vowel").map(|g| g.len()), Some(1));
        assert!(set.rule(RuleId(1)).is_some());
    }

    #[test]
    fn refuses_inconsistent_tables() {
        let err = RuleSet::compile(tables(vec![rule(1, "a", "vowel"), rule(1, "b", "vowel")])).unwrap_err();
        assert!(matches!(err, InitError::DuplicateRule { id: 1 }));

        let err = RuleSet::compile(tables(vec![rule(1, "a", "consonant")])).unwrap_err();
        assert!(matches!(err, InitError::UnknownSandhiGroup { rule: 1, .. }));

        let err = RuleSet::compile(tables(vec![rule(1, "has space", "vowel")])).unwrap_err();
        assert!(matches!(err, InitError::InvalidLabel { rule: 1, .. }));

        let mut bad_term = rule(1, "a", "vowel");
        bad_term.pattern = params![3 => 99];
        let err = RuleSet::compile(tables(vec![bad_term])).unwrap_err();
        assert!(matches!(err, InitError::UnknownTerm { rule: 1, position: 3, term: 99 }));

        let mut bad_carry = rule(1, "a", "vowel");
        bad_carry.left.carry = vec![21];
        assert!(matches!(RuleSet::compile(tables(vec![bad_carry])), Err(InitError::Parameters(_))));
    }

    #[test]
    fn sentinel_and_known_terms_are_accepted() {
        let mut r = rule(1, "a", "vowel");
        r.pattern = params![1 => 10, 2 => crate::UNSET];
        assert!(RuleSet::compile(tables(vec![r])).is_ok());
    }

    #[test]
    fn sandhi_conditions_are_anchored() {
        let mut t = tables(vec![]);
        t.sandhi_groups[0].rules = vec![sandhi(1, Some("[^aeiou]"))];
        let set = RuleSet::compile(t).unwrap();
        let s = &set.sandhi_group("vowel").unwrap()[0];
        assert!(s.accepts_context("gat", "ti"));
        assert!(!s.accepts_context("gao", "ti"));
        // Anchored at the end of the stem, so an earlier consonant is irrelevant.
        assert!(!s.accepts_context("tao", "ti"));

        let mut t = tables(vec![]);
        t.sandhi_groups[0].rules = vec![sandhi(1, Some("("))];
        assert!(matches!(RuleSet::compile(t), Err(InitError::InvalidCondition { rule: 1, .. })));
    }

    #[test]
    fn duplicate_sandhi_ids_across_groups_are_rejected() {
        let mut t = tables(vec![]);
        t.sandhi_groups.push(SandhiGroupRecord { name: "other".into(), rules: vec![sandhi(1, None)] });
        assert!(matches!(RuleSet::compile(t), Err(InitError::DuplicateSandhiRule { id: 1 })));
    }
}
