//! Relevance between a source task and a link candidate.
//!
//! # Overview
//!
//! Relevance is an integer built from shared attributes:
//!
//! | feature          | weight                    |
//! |------------------|---------------------------|
//! | same domain      | [`DOMAIN_WEIGHT`] (12)    |
//! | same epic        | [`EPIC_WEIGHT`] (10)      |
//! | same kind        | [`KIND_WEIGHT`] (5)       |
//! | shared labels    | [`LABEL_WEIGHT`] (1) each |
//!
//! An attribute only counts when both tasks declare it. Empty domains and
//! epics are undeclared; an empty kind is a kind. Labels are compared as
//! sets: a label repeated on one side still counts once.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tether_search::relevance;
//!
//! let score = relevance(&source, &candidate);
//! println!("domain={} epic={} kind={} labels={} total={}",
//!          score.domain, score.epic, score.kind, score.shared_labels, score.total());
//! ```

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use serde::Serialize;
use tether_core::Task;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

pub const DOMAIN_WEIGHT: u32 = 12;
pub const EPIC_WEIGHT: u32 = 10;
pub const KIND_WEIGHT: u32 = 5;
pub const LABEL_WEIGHT: u32 = 1;

// ---------------------------------------------------------------------------
// RelevanceScore
// ---------------------------------------------------------------------------

/// Per-feature relevance breakdown.
///
/// Kept separate so callers can show why a candidate ranked where it did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelevanceScore {
    /// [`DOMAIN_WEIGHT`] when both tasks declare the same domain, else 0.
    pub domain: u32,
    /// [`EPIC_WEIGHT`] when both tasks declare the same epic, else 0.
    pub epic: u32,
    /// [`KIND_WEIGHT`] when both tasks declare the same kind, else 0.
    pub kind: u32,
    /// Number of distinct labels present on both tasks.
    pub shared_labels: u32,
}

impl RelevanceScore {
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.domain + self.epic + self.kind + self.shared_labels * LABEL_WEIGHT
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score `candidate` against `source`.
#[must_use]
pub fn relevance(source: &Task, candidate: &Task) -> RelevanceScore {
    RelevanceScore {
        domain: bonus(source.domain(), candidate.domain(), DOMAIN_WEIGHT),
        epic: bonus(source.epic_id(), candidate.epic_id(), EPIC_WEIGHT),
        kind: bonus(source.kind(), candidate.kind(), KIND_WEIGHT),
        shared_labels: shared_label_count(&source.etiquettes, &candidate.etiquettes),
    }
}

fn bonus(a: Option<&str>, b: Option<&str>, weight: u32) -> u32 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => weight,
        _ => 0,
    }
}

fn shared_label_count(a: &[String], b: &[String]) -> u32 {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    u32::try_from(a.intersection(&b).count()).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
