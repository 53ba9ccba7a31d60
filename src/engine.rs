//! Decomposition engine.
//!
//! ## How the parts work together
//!
//! ```text
//! RuleTables ──┐
//!              │  RuleSet::compile                 (compiled_rules.rs)
//!              └──────────────┬─────────────
//!                             │ Arc<RuleSet>
//!                             v
//!                    RuleManager                   (rule_manager.rs)
//!                      - rules_for(label, params)   memoized
//!                      - splits_for(entry, rule)    memoized ──▶ find_splits (sandhi.rs)
//!                             │
//! entry ── Parser::run ───────┤                    (parser.rs)
//!            - lexicon lookup │
//!            - recurse left/right (rayon)
//!            - combine + project parameters
//!            - score ◀──────── RatingService       (rating.rs)
//!                             │
//!                             v
//!                  SolutionTree::build             (tree.rs, dedup.rs)
//!                    - prune, dedup, rank
//!                             │
//!                             v
//!                       SolutionTree
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiled_rules.rs`: validates loader tables and indexes rules by label
//!   and sandhi rules by group.
//! - `sandhi.rs`: proposes every split of a string allowed by a sandhi group.
//! - `rule_manager.rs`: single-flight memo tables over rule and split lookups.
//! - `rating.rs`: frequency ratings under an explicit chronological layer.
//! - `control.rs`: cancellation token and depth progress hook.
//! - `parser.rs`: the recursive decomposition state machine.
//! - `dedup.rs` / `tree.rs`: solution identity, ranking and the arena tree.
//! - `metrics.rs`: optional timing/counter data for verbose runs.
//!
//! ## Debugging
//!
//! The engine emits `tracing` events: `debug` for compilation and parse
//! summaries, `trace` for cache misses and every descent.

#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/control.rs"]
mod control;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/parser.rs"]
mod parser;
#[path = "engine/rating.rs"]
mod rating;
#[path = "engine/rule_manager.rs"]
mod rule_manager;
#[path = "engine/sandhi.rs"]
mod sandhi;
#[path = "engine/tree.rs"]
mod tree;

pub use compiled_rules::{MorphRule, Projection, RuleId, RuleSet, SandhiRule, SandhiRuleId};
pub use control::{CancellationToken, DepthObserver};
pub use metrics::RunMetrics;
pub(crate) use parser::{Interrupt, ParseCounters, Parser};
pub use rating::{LayerContext, RatingService};
pub use rule_manager::{CacheStats, RuleManager};
pub use sandhi::{SandhiMatch, find_splits};
pub use tree::{ChildRole, NodeId, ParentLink, SolutionNode, SolutionTree};
pub(crate) use tree::Candidate;
