//! Id → task lookup used by the cycle detector and the linker.
//!
//! # Overview
//!
//! The cycle detector only needs "given an id, give me the task", so it is
//! generic over the [`TaskLookup`] trait. [`TaskIndex`] is the borrowed,
//! hash-map backed implementation built from a task slice; owned maps
//! (`HashMap<String, Task>`, `BTreeMap<String, Task>`) implement the trait
//! too so callers that already keep tasks keyed by id can pass them as-is.
//!
//! The index is a snapshot: build it from the current collection
//! immediately before validating, and drop it afterwards.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::model::Task;

/// Anything that can resolve a task id to a task.
pub trait TaskLookup {
    /// Return the task with the given id, if known.
    fn get_task(&self, id: &str) -> Option<&Task>;

    /// Return `true` if the id resolves to a task.
    fn contains_task(&self, id: &str) -> bool {
        self.get_task(id).is_some()
    }
}

impl TaskLookup for HashMap<String, Task> {
    fn get_task(&self, id: &str) -> Option<&Task> {
        self.get(id)
    }
}

impl TaskLookup for BTreeMap<String, Task> {
    fn get_task(&self, id: &str) -> Option<&Task> {
        self.get(id)
    }
}

// ---------------------------------------------------------------------------
// TaskIndex
// ---------------------------------------------------------------------------

/// Borrowed id → task map over a task slice.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex<'a> {
    by_id: HashMap<&'a str, &'a Task>,
}

impl<'a> TaskIndex<'a> {
    /// Build an index from a task collection.
    ///
    /// When two tasks share an id the later one wins; the collision is
    /// logged because it means the caller's store is inconsistent.
    pub fn from_tasks(tasks: &'a [Task]) -> Self {
        let mut by_id = HashMap::with_capacity(tasks.len());
        for task in tasks {
            if by_id.insert(task.id.as_str(), task).is_some() {
                warn!(id = %task.id, "duplicate task id in collection; keeping the last one");
            }
        }
        Self { by_id }
    }

    /// Number of distinct ids in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl TaskLookup for TaskIndex<'_> {
    fn get_task(&self, id: &str) -> Option<&Task> {
        self.by_id.get(id).copied()
    }
}

// ---------------------------------------------------------------------------
// Neighbourhood queries
// ---------------------------------------------------------------------------

/// Tasks listed in `id`'s `dependsOn` that resolve in the lookup.
///
/// Returns an empty list when `id` itself is unknown.
pub fn blockers_of<'l, L: TaskLookup>(lookup: &'l L, id: &str) -> Vec<&'l Task> {
    lookup.get_task(id).map_or_else(Vec::new, |task| {
        task.depends_on
            .iter()
            .filter_map(|blocker| lookup.get_task(blocker))
            .collect()
    })
}

/// Tasks listed in `id`'s `blocks` that resolve in the lookup.
///
/// Returns an empty list when `id` itself is unknown.
pub fn dependents_of<'l, L: TaskLookup>(lookup: &'l L, id: &str) -> Vec<&'l Task> {
    lookup.get_task(id).map_or_else(Vec::new, |task| {
        task.blocks
            .iter()
            .filter_map(|blocked| lookup.get_task(blocked))
            .collect()
    })
}
