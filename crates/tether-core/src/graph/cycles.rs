//! Cycle detection for a candidate blocking edge.
//!
//! # Overview
//!
//! Blocking edges form a directed graph (`blocker → blocked`, stored in each
//! task's `blocks` list). A cycle would leave every task on it waiting on
//! another, so a new edge is refused when it would close one.
//!
//! # Design
//!
//! - **Stack-based DFS**: start at the blocked task, follow `blocks` edges
//!   outward, and look for the blocker. Reaching it means the new edge
//!   closes a loop. No recursion, so deep chains cannot overflow the stack.
//! - **Visited set**: every id is expanded at most once, which bounds the
//!   walk at O(V+E) and guarantees termination even when the stored data
//!   already contains loops.
//! - **Dead ends**: ids that do not resolve in the lookup are skipped,
//!   never reported as errors.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tether_core::graph::{cycles::would_create_cycle, index::TaskIndex};
//!
//! let index = TaskIndex::from_tasks(&tasks);
//! if would_create_cycle(&index, "t-blocker", "t-blocked") {
//!     eprintln!("would create a cycle");
//! }
//! ```

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::index::TaskLookup;

// ---------------------------------------------------------------------------
// CycleWarning
// ---------------------------------------------------------------------------

/// The loop a candidate edge would close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleWarning {
    /// Ordered ids forming the loop, starting and ending at the blocker.
    ///
    /// For a new edge `C → A` over an existing chain `A → B → C` the path is
    /// `["C", "A", "B", "C"]`.
    pub cycle_path: Vec<String>,

    /// The blocker of the candidate edge.
    pub blocker: String,

    /// The blocked task of the candidate edge.
    pub blocked: String,
}

impl CycleWarning {
    /// Number of distinct tasks in the loop.
    pub fn cycle_len(&self) -> usize {
        self.cycle_path.len().saturating_sub(1)
    }

    /// `true` when the candidate edge links a task to itself.
    pub fn is_self_loop(&self) -> bool {
        self.blocker == self.blocked
    }

    /// `true` for a two-task loop (A blocks B, B blocks A).
    pub fn is_mutual_block(&self) -> bool {
        self.cycle_len() == 2
    }
}

impl fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_self_loop() {
            write!(f, "would create a cycle: '{}' would block itself", self.blocker)
        } else if self.is_mutual_block() {
            write!(
                f,
                "would create a cycle: '{}' and '{}' would block each other",
                self.blocker, self.blocked
            )
        } else {
            write!(
                f,
                "would create a cycle ({} tasks): {}",
                self.cycle_len(),
                self.cycle_path.join(" → ")
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Decide whether adding `blocker → blocked` would create a cycle.
///
/// Walks `blocks` edges outward from `blocked_id`; returns `true` as soon as
/// `blocker_id` is reached. `blocker_id == blocked_id` is trivially a cycle.
pub fn would_create_cycle<L: TaskLookup>(lookup: &L, blocker_id: &str, blocked_id: &str) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![blocked_id];

    while let Some(current) = stack.pop() {
        if current == blocker_id {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        let Some(task) = lookup.get_task(current) else {
            continue;
        };
        for next in &task.blocks {
            if !visited.contains(next.as_str()) {
                stack.push(next.as_str());
            }
        }
    }

    false
}

/// Like [`would_create_cycle`], but returns the loop that would be closed.
///
/// The path is reconstructed from the DFS parent map, so it is one loop
/// through the new edge, not necessarily the shortest.
pub fn find_cycle_path<L: TaskLookup>(
    lookup: &L,
    blocker_id: &str,
    blocked_id: &str,
) -> Option<CycleWarning> {
    if blocker_id == blocked_id {
        return Some(CycleWarning {
            cycle_path: vec![blocker_id.to_string(), blocker_id.to_string()],
            blocker: blocker_id.to_string(),
            blocked: blocked_id.to_string(),
        });
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut stack: Vec<&str> = vec![blocked_id];
    let mut found = false;

    while let Some(current) = stack.pop() {
        if current == blocker_id {
            found = true;
            break;
        }
        if !visited.insert(current) {
            continue;
        }
        let Some(task) = lookup.get_task(current) else {
            continue;
        };
        for next in &task.blocks {
            let next = next.as_str();
            if !visited.contains(next) {
                parent.entry(next).or_insert(current);
                stack.push(next);
            }
        }
    }

    if !found {
        return None;
    }

    // Walk back from the blocker to the blocked task, then reverse.
    let mut chain = vec![blocker_id.to_string()];
    let mut current = blocker_id;
    while current != blocked_id {
        match parent.get(current) {
            Some(prev) => {
                chain.push((*prev).to_string());
                current = prev;
            }
            None => break,
        }
    }
    chain.push(blocker_id.to_string());
    chain.reverse();

    Some(CycleWarning {
        cycle_path: chain,
        blocker: blocker_id.to_string(),
        blocked: blocked_id.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
