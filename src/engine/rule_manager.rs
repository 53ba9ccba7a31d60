//! Memoized rule and sandhi lookups.
//!
//! The decomposition recursion asks the same questions many times: the same
//! `(label, parameters)` obligation shows up under different splits, and the
//! same substring is re-split under different parents. [`RuleManager`] caches
//! both lookups for the lifetime of the manager (or until [`RuleManager::clear`]).
//!
//! ## Single-flight
//!
//! Each memo table maps a key to an `Arc<OnceCell<V>>`:
//!
//! ```text
//! get(key)
//!   ├─ DashMap entry (shard lock held only for insert-or-clone of the Arc)
//!   └─ OnceCell::get_or_init(compute)
//!        ├─ first caller computes
//!        └─ concurrent callers block on the same cell, then read the value
//! ```
//!
//! The shard guard is released before `compute` runs, so one slow key never
//! stalls unrelated keys hashed to the same shard, and no caller can observe a
//! partially built value.

use super::compiled_rules::{MorphRule, RuleId, RuleSet};
use super::sandhi::{SandhiMatch, find_splits};
use crate::params::ParameterVector;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Memo<K, V> = DashMap<K, Arc<OnceCell<V>>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    label: String,
    parameters: ParameterVector,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SplitKey {
    entry: String,
    rule: RuleId,
}

/// Snapshot of cache counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Rule-table scans performed (one per distinct rule key).
    pub rule_scans: u64,
    /// Sandhi matcher runs performed (one per distinct split key).
    pub sandhi_scans: u64,
    /// Lookups answered from an existing memo entry.
    pub hits: u64,
    pub rule_entries: usize,
    pub sandhi_entries: usize,
}

#[derive(Debug)]
pub struct RuleManager {
    rules: Arc<RuleSet>,
    rule_memo: Memo<RuleKey, Arc<[Arc<MorphRule>]>>,
    split_memo: Memo<SplitKey, Arc<[SandhiMatch]>>,
    rule_scans: AtomicU64,
    sandhi_scans: AtomicU64,
    hits: AtomicU64,
}

impl RuleManager {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        RuleManager {
            rules,
            rule_memo: DashMap::new(),
            split_memo: DashMap::new(),
            rule_scans: AtomicU64::new(0),
            sandhi_scans: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    pub fn rule_set(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Every rule labelled `label` whose pattern matches `parameters`.
    ///
    /// Memoized by the exact `(label, parameters)` value.
    pub fn rules_for(&self, label: &str, parameters: &ParameterVector) -> Arc<[Arc<MorphRule>]> {
        let key = RuleKey { label: label.to_string(), parameters: *parameters };
        let (rules, computed) = memoized(&self.rule_memo, key, || {
            self.rule_scans.fetch_add(1, Ordering::Relaxed);
            let found: Vec<Arc<MorphRule>> =
                self.rules.rules_labelled(label).filter(|r| r.pattern.matches(parameters)).cloned().collect();
            tracing::trace!(label, %parameters, found = found.len(), "rule cache miss");
            found.into()
        });
        if !computed {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        rules
    }

    /// Sandhi splits of `entry` under the group `rule` references.
    ///
    /// Memoized by `(entry, rule id)`.
    pub fn splits_for(&self, entry: &str, rule: &MorphRule) -> Arc<[SandhiMatch]> {
        let key = SplitKey { entry: entry.to_string(), rule: rule.id };
        let (splits, computed) = memoized(&self.split_memo, key, || {
            self.sandhi_scans.fetch_add(1, Ordering::Relaxed);
            let found = self.rules.sandhi_group(&rule.sandhi_group).map(|g| find_splits(entry, g)).unwrap_or_default();
            tracing::trace!(entry, rule = %rule.id, found = found.len(), "sandhi cache miss");
            found.into()
        });
        if !computed {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        splits
    }

    /// Drop every memoized lookup. The compiled rule set is untouched.
    pub fn clear(&self) {
        self.rule_memo.clear();
        self.split_memo.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            rule_scans: self.rule_scans.load(Ordering::Relaxed),
            sandhi_scans: self.sandhi_scans.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            rule_entries: self.rule_memo.len(),
            sandhi_entries: self.split_memo.len(),
        }
    }
}

/// Compute-at-most-once lookup. Returns the value and whether this call computed it.
fn memoized<K, V, F>(memo: &Memo<K, V>, key: K, compute: F) -> (V, bool)
where
    K: Eq + Hash,
    V: Clone,
    F: FnOnce() -> V,
{
    let cell = memo.entry(key).or_default().value().clone();
    let mut computed = false;
    let value = cell
        .get_or_init(|| {
            computed = true;
            compute()
        })
        .clone();
    (value, computed)
}
