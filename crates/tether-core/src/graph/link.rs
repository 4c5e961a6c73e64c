//! Symmetric edge mutation.
//!
//! A blocking edge is stored twice: the blocker lists the blocked task in
//! `blocks`, and the blocked task lists the blocker in `dependsOn`. The two
//! functions here keep both sides in step and return fresh copies; the
//! inputs are never modified.
//!
//! Neither function validates. Callers run the policy and cycle checks
//! first (see [`crate::linker::Linker`]); keeping mutation unconditional
//! lets the same code path remove edges administratively without having to
//! satisfy the current policy.

use serde::Serialize;
use tracing::trace;

use crate::model::Task;

/// Updated copies of both endpoints of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedPair {
    /// The blocker side.
    pub a: Task,
    /// The blocked side.
    pub b: Task,
}

/// Create the edge `a → b` (a blocks b).
///
/// Both returned tasks have fully normalized edge lists, including lists
/// unrelated to this edge.
#[must_use]
pub fn link_pair(a: &Task, b: &Task) -> LinkedPair {
    let mut a2 = a.clone();
    let mut b2 = b.clone();
    a2.blocks.push(b.id.clone());
    b2.depends_on.push(a.id.clone());
    a2.normalize_edges();
    b2.normalize_edges();
    trace!(blocker = %a.id, blocked = %b.id, "linked pair");
    LinkedPair { a: a2, b: b2 }
}

/// Remove the edge `a → b`. Removing an absent edge is a no-op apart from
/// normalization.
#[must_use]
pub fn unlink_pair(a: &Task, b: &Task) -> LinkedPair {
    let mut a2 = a.clone();
    let mut b2 = b.clone();
    a2.blocks.retain(|id| id != &b.id);
    b2.depends_on.retain(|id| id != &a.id);
    a2.normalize_edges();
    b2.normalize_edges();
    trace!(blocker = %a.id, blocked = %b.id, "unlinked pair");
    LinkedPair { a: a2, b: b2 }
}
