#![forbid(unsafe_code)]
//! tether-search library: relevance scoring and link suggestions.
//!
//! # Conventions
//!
//! - **Errors**: scoring and ranking are total functions; nothing here fails.
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`).

pub mod relevance;
pub mod suggest;

pub use relevance::{RelevanceScore, relevance};
pub use suggest::{DEFAULT_SUGGESTION_LIMIT, Suggestion, suggest_candidates, suggest_scored};
