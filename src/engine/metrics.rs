//! Engine run metrics.
//!
//! Timing is measured by explicit wrapping at the call site in
//! `Analyzer::parse_verbose`; the parser itself only bumps a few atomic
//! counters. The plain `Analyzer::parse` path skips all of this.

use super::rule_manager::CacheStats;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for the parse call.
    pub total: Duration,
    /// Time spent in recursive decomposition.
    pub decompose: Duration,
    /// Time spent pruning, deduplicating and ranking into the final tree.
    pub build: Duration,
    /// Recursive descents performed (one per accepted split).
    pub descents: usize,
    /// Deepest recursion level reached.
    pub max_depth: usize,
    /// Candidate nodes produced before pruning and deduplication.
    pub candidates: usize,
    /// Rule manager counters after the run (cumulative for the manager).
    pub cache: CacheStats,
}
