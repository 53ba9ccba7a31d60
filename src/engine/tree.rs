//! Solution tree assembly.
//!
//! The parser produces owned [`Candidate`] trees. This module turns them into
//! the arena-backed [`SolutionTree`] handed to callers:
//!
//! ```text
//! Vec<Candidate> ──▶ prune failures (unless debug)
//!                ──▶ dedup alternatives by SolutionKey (dedup.rs)
//!                ──▶ sort: successes first (debug), rating descending
//!                ──▶ arena insert, children in Left/Right order
//! ```
//!
//! Roots are the alternative analyses of the requested entry. Every derived
//! node has exactly two children, its left and right constituents; those keep
//! their positional order and are never re-sorted.
//!
//! Nodes are addressed by [`NodeId`]. A node's parent is a non-owning
//! [`ParentLink`] (index + role); ownership runs strictly top-down.

use super::compiled_rules::{RuleId, SandhiRuleId};
use super::dedup::dedup_keep_best;
use crate::{MorphEntry, SolutionContent};
use std::cmp::Ordering;
use std::ops::Index;

/// Owned parse result as produced by the parser, before arrangement.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub surface: String,
    pub label: String,
    pub rule: Option<RuleId>,
    pub sandhi: Option<SandhiRuleId>,
    pub content: SolutionContent,
    pub rating: f64,
    /// Source tag of the lexicon entry behind a terminal hit.
    pub source: String,
    pub children: Vec<Candidate>,
}

impl Candidate {
    pub(crate) fn leaf(
        surface: impl Into<String>,
        label: impl Into<String>,
        content: SolutionContent,
        rating: f64,
    ) -> Self {
        Candidate {
            surface: surface.into(),
            label: label.into(),
            rule: None,
            sandhi: None,
            content,
            rating,
            source: String::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn is_failed(&self) -> bool {
        self.content.is_failed()
    }

    /// Number of nodes in this candidate tree.
    pub(crate) fn size(&self) -> usize {
        1 + self.children.iter().map(Candidate::size).sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildRole {
    Left,
    Right,
}

/// Back-reference from a child to its parent. Carries no ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub node: NodeId,
    pub role: ChildRole,
}

#[derive(Debug, Clone)]
pub struct SolutionNode {
    pub surface: String,
    /// Grammatical label of the obligation this node answers.
    pub label: String,
    /// Grammatical rule that produced the node (derived nodes only).
    pub rule: Option<RuleId>,
    /// Sandhi rule used to split the surface (derived nodes only).
    pub sandhi: Option<SandhiRuleId>,
    pub content: SolutionContent,
    pub rating: f64,
    /// Source tag of the attested entry, empty for derived and failed nodes.
    pub source: String,
    children: Vec<NodeId>,
    parent: Option<ParentLink>,
}

impl SolutionNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    pub fn is_failed(&self) -> bool {
        self.content.is_failed()
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }
}

/// Ranked tree of alternative analyses.
#[derive(Debug, Clone, Default)]
pub struct SolutionTree {
    nodes: Vec<SolutionNode>,
    roots: Vec<NodeId>,
}

impl SolutionTree {
    pub(crate) fn build(candidates: Vec<Candidate>, debug: bool) -> Self {
        let mut tree = SolutionTree::default();
        for candidate in arrange(candidates, debug) {
            let id = tree.insert(candidate, None);
            tree.roots.push(id);
        }
        tree
    }

    fn insert(&mut self, candidate: Candidate, parent: Option<ParentLink>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let Candidate { surface, label, rule, sandhi, content, rating, source, children } = candidate;
        self.nodes.push(SolutionNode {
            surface,
            label,
            rule,
            sandhi,
            content,
            rating,
            source,
            children: Vec::new(),
            parent,
        });

        for (i, child) in children.into_iter().enumerate() {
            let role = if i == 0 { ChildRole::Left } else { ChildRole::Right };
            let child_id = self.insert(child, Some(ParentLink { node: id, role }));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// Alternative analyses, best first.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&SolutionNode> {
        self.nodes.get(id.0)
    }

    /// Highest-ranked successful analysis.
    pub fn best(&self) -> Option<&SolutionNode> {
        self.roots.iter().map(|&id| &self[id]).find(|n| !n.is_failed())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SolutionNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Pre-order walk below (and including) `root`, with depths relative to it.
    pub fn walk(&self, root: NodeId) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, root)];
        while let Some((depth, id)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            out.push((depth, id));
            for &child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Rebuild a [`MorphEntry`] decomposition from a successful node.
    ///
    /// Returns `None` for failed nodes or nodes with failed constituents.
    pub fn to_entry(&self, id: NodeId) -> Option<MorphEntry> {
        let node = self.get(id)?;
        if node.is_failed() {
            return None;
        }
        let c = &node.content;
        match node.children.as_slice() {
            [] => Some(MorphEntry {
                id: c.id,
                surface: node.surface.clone(),
                parameters: c.parameters,
                base: c.base,
                is_virtual: c.is_virtual,
                source: node.source.clone(),
                left: None,
                right: None,
            }),
            [left, right] => {
                let left = self.to_entry(*left)?;
                let right = self.to_entry(*right)?;
                Some(MorphEntry::derived(node.surface.clone(), c.parameters, c.base, left, right))
            }
            _ => None,
        }
    }
}

impl Index<NodeId> for SolutionTree {
    type Output = SolutionNode;

    fn index(&self, id: NodeId) -> &SolutionNode {
        &self.nodes[id.0]
    }
}

/// Prune, dedup and rank one list of alternatives.
fn arrange(candidates: Vec<Candidate>, debug: bool) -> Vec<Candidate> {
    let kept: Vec<Candidate> = candidates.into_iter().filter(|c| debug || !c.is_failed()).collect();
    let mut kept = dedup_keep_best(kept);
    kept.sort_by(|a, b| {
        let failed = if debug { a.is_failed().cmp(&b.is_failed()) } else { Ordering::Equal };
        failed.then(b.rating.total_cmp(&a.rating))
    });
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BaseKind, ErrorKind, ParameterVector};

    fn content(parameters: ParameterVector, error: Option<ErrorKind>) -> SolutionContent {
        SolutionContent { id: 0, parameters, base: BaseKind::Compound, is_virtual: true, error }
    }

    fn leaf(surface: &str, id: u32, rating: f64) -> Candidate {
        let mut c = Candidate::leaf(
            surface,
            "word",
            SolutionContent { id, parameters: params![], base: BaseKind::Stem, is_virtual: false, error: None },
            rating,
        );
        c.source = "dhātupāṭha".to_string();
        c
    }

    fn derived(surface: &str, parameters: ParameterVector, rating: f64) -> Candidate {
        let mut c = Candidate::leaf(surface, "phrase", content(parameters, None), rating);
        c.rule = Some(RuleId(1));
        c.children = vec![leaf("gata", 1, 1.0), leaf("iti", 2, 1.0)];
        c
    }

    fn failed(surface: &str, parameters: ParameterVector, rating: f64) -> Candidate {
        Candidate::leaf(surface, "phrase", content(parameters, Some(ErrorKind::NoRuleMatched)), rating)
    }

    #[test]
    fn ranks_alternatives_by_rating() {
        let tree = SolutionTree::build(
            vec![derived("a", params![1 => 1], 0.2), derived("b", params![1 => 2], 0.9), derived("c", params![1 => 3], 0.5)],
            false,
        );
        let order: Vec<&str> = tree.roots().iter().map(|&id| tree[id].surface.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(tree.best().map(|n| n.surface.as_str()), Some("b"));
    }

    #[test]
    fn duplicate_derivations_collapse_to_the_better_one() {
        let tree = SolutionTree::build(vec![derived("x", params![1 => 1], 0.3), derived("y", params![1 => 1], 0.8)], false);
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree[tree.roots()[0]].rating, 0.8);
        assert_eq!(tree[tree.roots()[0]].surface, "y");
    }

    #[test]
    fn failures_are_pruned_without_debug() {
        let tree = SolutionTree::build(vec![failed("x", params![1 => 9], 5.0), derived("y", params![1 => 1], 0.1)], false);
        assert_eq!(tree.roots().len(), 1);
        assert!(!tree[tree.roots()[0]].is_failed());
    }

    #[test]
    fn debug_mode_sorts_failures_last_regardless_of_rating() {
        let tree = SolutionTree::build(
            vec![failed("x", params![1 => 9], 5.0), derived("y", params![1 => 1], 0.1), derived("z", params![1 => 2], 0.4)],
            true,
        );
        let order: Vec<&str> = tree.roots().iter().map(|&id| tree[id].surface.as_str()).collect();
        assert_eq!(order, vec!["z", "y", "x"]);
        assert_eq!(tree[tree.roots()[2]].content.error, Some(ErrorKind::NoRuleMatched));
    }

    #[test]
    fn children_keep_position_and_link_back() {
        let tree = SolutionTree::build(vec![derived("gateti", params![], 1.0)], false);
        let root = tree.roots()[0];
        let kids = tree[root].children().to_vec();
        assert_eq!(kids.len(), 2);
        assert_eq!(tree[kids[0]].surface, "gata");
        assert_eq!(tree[kids[1]].surface, "iti");
        assert_eq!(tree[kids[0]].parent(), Some(ParentLink { node: root, role: ChildRole::Left }));
        assert_eq!(tree[kids[1]].parent(), Some(ParentLink { node: root, role: ChildRole::Right }));
        assert_eq!(tree[root].parent(), None);

        let walk: Vec<(usize, &str)> = tree.walk(root).into_iter().map(|(d, id)| (d, tree[id].surface.as_str())).collect();
        assert_eq!(walk, vec![(0, "gateti"), (1, "gata"), (1, "iti")]);
    }

    #[test]
    fn exports_morph_entries() {
        let tree = SolutionTree::build(vec![derived("gateti", params![], 1.0)], false);
        let entry = tree.to_entry(tree.roots()[0]).unwrap();
        assert!(entry.is_virtual);
        assert_eq!(entry.id, 0);
        assert_eq!(entry.left.as_ref().map(|e| e.surface.as_str()), Some("gata"));
        assert_eq!(entry.right.as_ref().map(|e| e.id), Some(2));
        assert!(entry.right.as_ref().is_some_and(|e| !e.is_virtual && e.is_terminal()));
        assert_eq!(entry.right.as_ref().map(|e| e.source.as_str()), Some("dhātupāṭha"));
        assert_eq!(entry.source, "");
        assert!(entry.validate().is_ok());
    }
}
