//! Error taxonomy.
//!
//! Errors are split by the point at which they surface:
//!
//! - [`ParameterError`]: a ParameterVector was built or indexed outside its
//!   fixed 21-position shape.
//! - [`InitError`]: the rule/term/sandhi tables (or the lexicon/frequency
//!   data) are inconsistent. Raised before any parse runs; the engine refuses
//!   to start.
//! - [`RatingError`]: precondition failures of the frequency rating service.
//! - [`EngineError`]: fatal outcomes of a single parse call.
//! - [`BundleError`]: the JSON loader boundary used by the CLI.
//!
//! Branch-local failures (no rule matched, parameter conflicts, unresolved
//! splits) are *not* errors. They are recorded on the solution nodes as
//! [`crate::ErrorKind`] and pruned or retained by the tree builder.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("parameter vector must have exactly {expected} positions, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("parameter index {index} is out of range (0..=20)")]
    IndexOutOfRange { index: usize },
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error("term id {id} is reserved and cannot name a term")]
    ReservedTerm { id: u8 },
    #[error("duplicate term id {id}")]
    DuplicateTerm { id: u8 },
    #[error("duplicate term label '{label}'")]
    DuplicateTermLabel { label: String },
    #[error("duplicate rule id {id}")]
    DuplicateRule { id: u32 },
    #[error("rule {rule}: invalid label '{label}'")]
    InvalidLabel { rule: u32, label: String },
    #[error("rule {rule}: unknown sandhi group '{group}'")]
    UnknownSandhiGroup { rule: u32, group: String },
    #[error("rule {rule}: position {position} names unknown term id {term}")]
    UnknownTerm { rule: u32, position: usize, term: u8 },
    #[error("duplicate sandhi group '{group}'")]
    DuplicateSandhiGroup { group: String },
    #[error("duplicate sandhi rule id {id}")]
    DuplicateSandhiRule { id: u32 },
    #[error("sandhi rule {rule}: invalid condition")]
    InvalidCondition {
        rule: u32,
        #[source]
        source: regex::Error,
    },
    #[error("duplicate lexicon entry for surface '{surface}'")]
    DuplicateEntry { surface: String },
    #[error("lexicon entry '{surface}': {reason}")]
    MalformedEntry { surface: String, reason: &'static str },
    #[error("frequency for '{surface}' at layer {layer} must be finite and non-negative")]
    InvalidFrequency { surface: String, layer: u32 },
    #[error(transparent)]
    Parameters(#[from] ParameterError),
    #[error("failed to build worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("no chronological layer has been set for this session")]
    LayerUnset,
    #[error("'{entry}' is not attested in any chronological layer")]
    LayerNotFound { entry: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot parse an empty entry")]
    EmptyEntry,
    #[error("frequency rating ratio must be finite and non-negative, got {0}")]
    InvalidRatio(f64),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Parameters(#[from] ParameterError),
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read bundle")]
    Io(#[from] std::io::Error),
    #[error("malformed bundle")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Init(#[from] InitError),
}
