//! Bundled grammar data.
//!
//! The engine itself is data-driven: real grammars arrive as a JSON
//! [`Bundle`](crate::Bundle). What lives here is a deliberately small grammar
//! used by the end-to-end tests, the doc examples and the CLI when no bundle
//! is given.

#[path = "rules/sample.rs"]
pub mod sample;
