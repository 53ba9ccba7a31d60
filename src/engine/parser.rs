//! Recursive decomposition parser.
//!
//! This module is the operational core of the engine. One parse answers an
//! *obligation*: "analyse `surface` as a `label` whose parameters match
//! `parameters`". Each obligation moves through a small state machine:
//!
//! ```text
//!            ┌──────────────┐ hit (non-virtual, params match)
//! surface ──▶│ lexicon      │────────────────────────────────▶ TERMINAL
//!            └──────┬───────┘
//!                   │ miss
//!            ┌──────▼───────┐ no rule
//!            │ rule fetch   │────────────────────────────────▶ NoRuleMatched
//!            └──────┬───────┘
//!                   │ rules (par_iter)
//!            ┌──────▼───────┐ no split for this rule
//!            │ split search │────────────────────────────────▶ (contributes nothing)
//!            └──────┬───────┘
//!                   │ splits (par_iter), cancellation checkpoint
//!            ┌──────▼───────┐
//!            │ recurse      │  rayon::join(left, right), depth + 1
//!            └──────┬───────┘
//!            ┌──────▼───────┐ carried parameters disagree
//!            │ combine      │────────────────────────────────▶ ParameterConflict
//!            └──────┬───────┘
//!                   ▼
//!              scored parent
//! ```
//!
//! There is no depth limit: recursion stops when the lexicon answers or no
//! rule/split applies. Rule data that loops forever is a data defect.
//!
//! ## Failures and debug mode
//!
//! Failed branches are candidates with an [`ErrorKind`]. Without debug mode
//! they are dropped as soon as they can no longer contribute; with debug mode
//! they are paired like successes so the caller can inspect where a parse
//! broke. The tree builder (`tree.rs`) does the final pruning and ranking.
//!
//! ## Cancellation
//!
//! The token is checked before every descent. Once set, the current branch
//! returns [`Interrupt::Cancelled`], rayon's `Result` collection stops
//! scheduling siblings, and the whole parse reports cancellation.

use super::compiled_rules::MorphRule;
use super::control::{CancellationToken, DepthObserver};
use super::dedup::dedup_keep_best;
use super::rating::{LayerContext, RatingService};
use super::rule_manager::RuleManager;
use super::sandhi::SandhiMatch;
use super::tree::Candidate;
use crate::error::{EngineError, RatingError};
use crate::lexicon::Lexicon;
use crate::params::{ParameterVector, WILDCARD};
use crate::{BaseKind, ErrorKind, SolutionContent};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rating weight of an attested lexical item before frequency is added.
const LEXICAL_CONFIDENCE: f64 = 1.0;

/// Why a parse stopped early.
#[derive(Debug)]
pub(crate) enum Interrupt {
    Cancelled,
    Failed(EngineError),
}

impl From<RatingError> for Interrupt {
    fn from(err: RatingError) -> Self {
        Interrupt::Failed(err.into())
    }
}

#[derive(Debug, Clone, Copy)]
struct Obligation<'s> {
    surface: &'s str,
    label: &'s str,
    parameters: ParameterVector,
}

/// Counters collected while parsing.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ParseCounters {
    pub descents: usize,
    pub max_depth: usize,
}

pub(crate) struct Parser<'a> {
    manager: &'a RuleManager,
    lexicon: &'a dyn Lexicon,
    ratings: &'a RatingService,
    layer: &'a LayerContext,
    cancellation: &'a CancellationToken,
    progress: Option<&'a dyn DepthObserver>,
    debug: bool,
    ratio: f64,
    descents: AtomicUsize,
    max_depth: AtomicUsize,
}

impl<'a> Parser<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        manager: &'a RuleManager,
        lexicon: &'a dyn Lexicon,
        ratings: &'a RatingService,
        layer: &'a LayerContext,
        cancellation: &'a CancellationToken,
        progress: Option<&'a dyn DepthObserver>,
        debug: bool,
        ratio: f64,
    ) -> Self {
        Parser {
            manager,
            lexicon,
            ratings,
            layer,
            cancellation,
            progress,
            debug,
            ratio,
            descents: AtomicUsize::new(0),
            max_depth: AtomicUsize::new(0),
        }
    }

    /// Decompose `surface` as `label` under `parameters`.
    pub(crate) fn run(
        &self,
        surface: &str,
        label: &str,
        parameters: ParameterVector,
    ) -> Result<Vec<Candidate>, Interrupt> {
        self.checkpoint()?;
        self.solve(Obligation { surface, label, parameters }, 0)
    }

    pub(crate) fn counters(&self) -> ParseCounters {
        ParseCounters {
            descents: self.descents.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }

    fn checkpoint(&self) -> Result<(), Interrupt> {
        if self.cancellation.is_cancelled() {
            tracing::debug!("cancellation observed");
            return Err(Interrupt::Cancelled);
        }
        Ok(())
    }

    fn solve(&self, ob: Obligation<'_>, depth: usize) -> Result<Vec<Candidate>, Interrupt> {
        if let Some(entry) = self.lexicon.find_entry(ob.surface) {
            if !entry.is_virtual && ob.parameters.matches(&entry.parameters) {
                let rating = LEXICAL_CONFIDENCE + self.scaled_rating(ob.surface)?;
                let content = SolutionContent {
                    id: entry.id,
                    parameters: entry.parameters,
                    base: entry.base,
                    is_virtual: false,
                    error: None,
                };
                let mut leaf = Candidate::leaf(ob.surface, ob.label, content, rating);
                leaf.source = entry.source;
                return Ok(vec![leaf]);
            }
        }

        let rules = self.manager.rules_for(ob.label, &ob.parameters);
        if rules.is_empty() {
            return Ok(self.failure(&ob, ErrorKind::NoRuleMatched));
        }

        let per_rule: Vec<Vec<Candidate>> =
            rules.par_iter().map(|rule| self.expand_rule(&ob, rule, depth)).collect::<Result<_, _>>()?;
        let found: Vec<Candidate> = per_rule.into_iter().flatten().collect();

        if found.is_empty() {
            return Ok(self.failure(&ob, ErrorKind::AmbiguousSplit));
        }
        Ok(found)
    }

    fn expand_rule(&self, ob: &Obligation<'_>, rule: &MorphRule, depth: usize) -> Result<Vec<Candidate>, Interrupt> {
        let splits = self.manager.splits_for(ob.surface, rule);
        let per_split: Vec<Vec<Candidate>> =
            splits.par_iter().map(|split| self.expand_split(ob, rule, split, depth)).collect::<Result<_, _>>()?;
        Ok(per_split.into_iter().flatten().collect())
    }

    fn expand_split(
        &self,
        ob: &Obligation<'_>,
        rule: &MorphRule,
        split: &SandhiMatch,
        depth: usize,
    ) -> Result<Vec<Candidate>, Interrupt> {
        self.checkpoint()?;
        let depth = depth + 1;
        self.descend(depth, ob, split);

        let left = Obligation { surface: &split.left, label: &rule.left.label, parameters: rule.left.parameters };
        let right = Obligation { surface: &split.right, label: &rule.right.label, parameters: rule.right.parameters };
        let (left, right) = rayon::join(|| self.solve(left, depth), || self.solve(right, depth));
        let left = self.usable(left?);
        let right = self.usable(right?);

        if left.is_empty() || right.is_empty() {
            return Ok(Vec::new());
        }

        let own = self.scaled_rating(ob.surface)?;
        let mut out = Vec::with_capacity(left.len() * right.len());
        for l in &left {
            for r in &right {
                out.push(self.combine(ob, rule, split, l.clone(), r.clone(), own));
            }
        }
        Ok(out)
    }

    /// Alternatives a parent may be built from.
    fn usable(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let candidates =
            if self.debug { candidates } else { candidates.into_iter().filter(|c| !c.is_failed()).collect() };
        dedup_keep_best(candidates)
    }

    fn combine(
        &self,
        ob: &Obligation<'_>,
        rule: &MorphRule,
        split: &SandhiMatch,
        left: Candidate,
        right: Candidate,
        own: f64,
    ) -> Candidate {
        let (parameters, conflict) = project(rule, &left.content.parameters, &right.content.parameters);
        let error = left.content.error.or(right.content.error).or(conflict.then_some(ErrorKind::ParameterConflict));
        let rating = if error.is_some() { 0.0 } else { (left.rating + right.rating) / 2.0 + own };

        Candidate {
            surface: ob.surface.to_string(),
            label: ob.label.to_string(),
            rule: Some(rule.id),
            sandhi: Some(split.rule),
            content: SolutionContent { id: 0, parameters, base: rule.base, is_virtual: rule.is_virtual, error },
            rating,
            source: String::new(),
            children: vec![left, right],
        }
    }

    fn failure(&self, ob: &Obligation<'_>, kind: ErrorKind) -> Vec<Candidate> {
        if !self.debug {
            return Vec::new();
        }
        let content = SolutionContent {
            id: 0,
            parameters: ob.parameters,
            base: BaseKind::Unknown,
            is_virtual: true,
            error: Some(kind),
        };
        vec![Candidate::leaf(ob.surface, ob.label, content, 0.0)]
    }

    fn scaled_rating(&self, surface: &str) -> Result<f64, Interrupt> {
        if self.ratio == 0.0 {
            return Ok(0.0);
        }
        Ok(self.ratio * self.ratings.rating(self.layer, surface)?)
    }

    fn descend(&self, depth: usize, ob: &Obligation<'_>, split: &SandhiMatch) {
        self.descents.fetch_add(1, Ordering::Relaxed);
        self.max_depth.fetch_max(depth, Ordering::Relaxed);
        tracing::trace!(depth, surface = ob.surface, left = %split.left, right = %split.right, "descend");
        if let Some(progress) = self.progress {
            progress.on_depth(depth);
        }
    }
}

/// Build the parent vector: the rule's output, plus every carried child value.
///
/// Returns the vector and whether any carried value disagreed with one already
/// present.
fn project(rule: &MorphRule, left: &ParameterVector, right: &ParameterVector) -> (ParameterVector, bool) {
    let mut bytes = *rule.output.as_bytes();
    let mut conflict = false;

    for (carry, child) in [(rule.left.carry, left), (rule.right.carry, right)] {
        for i in carry.positions() {
            let value = child.as_bytes()[i];
            if value == WILDCARD {
                continue;
            }
            if bytes[i] == WILDCARD {
                bytes[i] = value;
            } else if bytes[i] != value {
                conflict = true;
            }
        }
    }

    (ParameterVector::from(bytes), conflict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compiled_rules::{Projection, RuleId};
    use crate::params::PositionSet;

    fn rule(output: ParameterVector, left: &[usize], right: &[usize]) -> MorphRule {
        let projection = |carry: &[usize]| Projection {
            label: "word".into(),
            parameters: ParameterVector::wildcard(),
            carry: PositionSet::from_positions(carry.iter().copied()).unwrap(),
        };
        MorphRule {
            id: RuleId(1),
            label: "phrase".into(),
            pattern: ParameterVector::wildcard(),
            sandhi_group: "vowel".into(),
            base: BaseKind::Compound,
            is_virtual: true,
            output,
            left: projection(left),
            right: projection(right),
        }
    }

    #[test]
    fn carried_values_fill_the_output() {
        let r = rule(params![0 => 1], &[1], &[2]);
        let (v, conflict) = project(&r, &params![1 => 10, 2 => 99], &params![1 => 77, 2 => 20]);
        assert!(!conflict);
        assert_eq!(v, params![0 => 1, 1 => 10, 2 => 20]);
    }

    #[test]
    fn disagreeing_children_conflict() {
        let r = rule(params![], &[2], &[2]);
        let (_, conflict) = project(&r, &params![2 => 20], &params![2 => 21]);
        assert!(conflict);

        let (v, conflict) = project(&r, &params![2 => 20], &params![2 => 20]);
        assert!(!conflict);
        assert_eq!(v, params![2 => 20]);
    }

    #[test]
    fn child_disagreeing_with_output_conflicts() {
        let r = rule(params![2 => 20], &[2], &[]);
        assert!(project(&r, &params![2 => 21], &params![]).1);
        assert!(!project(&r, &params![], &params![]).1);
    }
}
