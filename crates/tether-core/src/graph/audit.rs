//! Invariant audit and repair for a whole task collection.
//!
//! # Overview
//!
//! Edges are only supposed to change through the link protocol, but task
//! files get hand-edited and older stores predate the invariants. [`audit`]
//! reports every violation it can find; [`repair`] fixes the ones that have
//! an unambiguous fix.
//!
//! | Finding | Repaired by [`repair`] |
//! |---|---|
//! | self reference in `blocks`/`dependsOn` | dropped |
//! | duplicate edge id | deduplicated |
//! | dangling reference to an unknown task | dropped |
//! | one-sided edge | mirrored, or dropped if mirroring would close a cycle |
//! | domain mismatch across an edge | reported only |
//! | cycle between symmetric edges | reported only |
//!
//! Cycles are found with Tarjan's SCC over the union of both edge lists, so
//! a loop shows up even when only one side of some edge is recorded.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{debug, info};

use super::cycles::would_create_cycle;
use super::index::{TaskIndex, TaskLookup};
use super::link::link_pair;
use crate::model::Task;

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// Which edge list a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSide {
    Blocks,
    DependsOn,
}

/// One invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    SelfReference { id: String, side: EdgeSide },
    DuplicateEdge { id: String, target: String, side: EdgeSide },
    DanglingReference { id: String, target: String, side: EdgeSide },
    /// `blocker → blocked` is recorded on one side only; `missing_on` names
    /// the task whose list lacks the mirror entry.
    AsymmetricEdge { blocker: String, blocked: String, missing_on: String },
    DomainMismatch { blocker: String, blocked: String },
    /// Members of one strongly connected component, sorted.
    Cycle { members: Vec<String> },
}

impl Finding {
    /// `true` for findings [`repair`] can fix.
    #[must_use]
    pub const fn is_repairable(&self) -> bool {
        !matches!(self, Self::DomainMismatch { .. } | Self::Cycle { .. })
    }
}

/// Everything [`audit`] found, in a deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub task_count: usize,
    pub edge_count: usize,
    pub findings: Vec<Finding>,
}

impl AuditReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn cycles(&self) -> impl Iterator<Item = &[String]> {
        self.findings.iter().filter_map(|f| match f {
            Finding::Cycle { members } => Some(members.as_slice()),
            _ => None,
        })
    }
}

/// Counts of what [`repair`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    /// Tasks whose edge lists lost duplicates or self references.
    pub normalized: usize,
    /// Dangling references removed.
    pub dangling_dropped: usize,
    /// One-sided edges completed on the missing side.
    pub mirrored: usize,
    /// One-sided edges removed because completing them would close a cycle.
    pub cyclic_dropped: usize,
}

impl RepairSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.normalized + self.dangling_dropped + self.mirrored + self.cyclic_dropped
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Check every invariant over `tasks` without modifying anything.
#[must_use]
pub fn audit(tasks: &[Task]) -> AuditReport {
    let index = TaskIndex::from_tasks(tasks);
    let mut findings = Vec::new();

    for task in tasks {
        check_list(task, &task.blocks, EdgeSide::Blocks, &index, &mut findings);
        check_list(task, &task.depends_on, EdgeSide::DependsOn, &index, &mut findings);
    }

    let edges = union_edges(tasks, &index);
    let known: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    for &(blocker, blocked) in &edges {
        let (Some(a), Some(b)) = (known.get(blocker), known.get(blocked)) else {
            continue;
        };
        if !a.blocks_id(blocked) {
            findings.push(Finding::AsymmetricEdge {
                blocker: blocker.to_string(),
                blocked: blocked.to_string(),
                missing_on: blocker.to_string(),
            });
        } else if !b.depends_on_id(blocker) {
            findings.push(Finding::AsymmetricEdge {
                blocker: blocker.to_string(),
                blocked: blocked.to_string(),
                missing_on: blocked.to_string(),
            });
        }
        if let (Some(da), Some(db)) = (a.domain(), b.domain()) {
            if da != db {
                findings.push(Finding::DomainMismatch {
                    blocker: blocker.to_string(),
                    blocked: blocked.to_string(),
                });
            }
        }
    }

    findings.extend(
        find_all_cycles(tasks, &edges)
            .into_iter()
            .map(|members| Finding::Cycle { members }),
    );

    AuditReport {
        task_count: index.len(),
        edge_count: edges.len(),
        findings,
    }
}

fn check_list(
    task: &Task,
    list: &[String],
    side: EdgeSide,
    index: &TaskIndex<'_>,
    findings: &mut Vec<Finding>,
) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut self_reported = false;
    for target in list {
        if *target == task.id {
            if !self_reported {
                findings.push(Finding::SelfReference {
                    id: task.id.clone(),
                    side,
                });
                self_reported = true;
            }
            continue;
        }
        if !seen.insert(target.as_str()) {
            findings.push(Finding::DuplicateEdge {
                id: task.id.clone(),
                target: target.clone(),
                side,
            });
            continue;
        }
        if !index.contains_task(target) {
            findings.push(Finding::DanglingReference {
                id: task.id.clone(),
                target: target.clone(),
                side,
            });
        }
    }
}

/// Distinct `(blocker, blocked)` pairs recorded on either side, between
/// known, distinct tasks, in first-seen order.
fn union_edges<'a>(tasks: &'a [Task], index: &TaskIndex<'_>) -> Vec<(&'a str, &'a str)> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut edges = Vec::new();
    for task in tasks {
        let outgoing = task.blocks.iter().map(|b| (task.id.as_str(), b.as_str()));
        let incoming = task.depends_on.iter().map(|d| (d.as_str(), task.id.as_str()));
        for edge in outgoing.chain(incoming) {
            let (blocker, blocked) = edge;
            if blocker == blocked || !index.contains_task(blocker) || !index.contains_task(blocked) {
                continue;
            }
            if seen.insert(edge) {
                edges.push(edge);
            }
        }
    }
    edges
}

/// Strongly connected components that contain a loop, each sorted, the
/// whole list sorted.
fn find_all_cycles(tasks: &[Task], edges: &[(&str, &str)]) -> Vec<Vec<String>> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
    for task in tasks {
        nodes
            .entry(task.id.as_str())
            .or_insert_with(|| graph.add_node(task.id.clone()));
    }
    for (blocker, blocked) in edges {
        if let (Some(&from), Some(&to)) = (nodes.get(blocker), nodes.get(blocked)) {
            graph.add_edge(from, to, ());
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut ids: Vec<String> = component
                .into_iter()
                .filter_map(|idx| graph.node_weight(idx).cloned())
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect();
    cycles.sort_unstable();
    cycles
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

/// Fix the repairable findings in place.
///
/// Self references and duplicates are normalized away, dangling ids are
/// dropped, and one-sided edges are either mirrored or, when completing one
/// would close a loop among the edges already kept, removed. Cycles formed
/// purely by symmetric edges are left alone; they need a human decision.
pub fn repair(tasks: &mut [Task]) -> RepairSummary {
    let mut summary = RepairSummary::default();

    let known: HashSet<String> = tasks.iter().map(|t| t.id.clone()).collect();
    for task in tasks.iter_mut() {
        let before = (task.blocks.len(), task.depends_on.len());
        task.normalize_edges();
        if before != (task.blocks.len(), task.depends_on.len()) {
            summary.normalized += 1;
        }
        let before = task.blocks.len() + task.depends_on.len();
        task.blocks.retain(|id| known.contains(id));
        task.depends_on.retain(|id| known.contains(id));
        summary.dangling_dropped += before - (task.blocks.len() + task.depends_on.len());
    }

    // Collect one-sided edges, then strip them so only symmetric edges remain.
    let one_sided: Vec<(String, String)> = {
        let snapshot: &[Task] = tasks;
        let index = TaskIndex::from_tasks(snapshot);
        union_edges(snapshot, &index)
            .into_iter()
            .filter(|&(blocker, blocked)| !is_symmetric(snapshot, blocker, blocked))
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    };

    let position: HashMap<String, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();

    for (blocker, blocked) in &one_sided {
        for task in tasks.iter_mut() {
            if task.id == *blocker {
                task.blocks.retain(|id| id != blocked);
            }
            if task.id == *blocked {
                task.depends_on.retain(|id| id != blocker);
            }
        }
    }

    for (blocker, blocked) in &one_sided {
        let (Some(&bi), Some(&di)) = (position.get(blocker), position.get(blocked)) else {
            continue;
        };
        let closes_loop = {
            let index = TaskIndex::from_tasks(tasks);
            would_create_cycle(&index, blocker, blocked)
        };
        if closes_loop {
            debug!(%blocker, %blocked, "dropping one-sided edge that would close a cycle");
            summary.cyclic_dropped += 1;
            continue;
        }
        let pair = link_pair(&tasks[bi], &tasks[di]);
        tasks[bi] = pair.a;
        tasks[di] = pair.b;
        summary.mirrored += 1;
    }

    info!(
        normalized = summary.normalized,
        dangling_dropped = summary.dangling_dropped,
        mirrored = summary.mirrored,
        cyclic_dropped = summary.cyclic_dropped,
        "repair finished"
    );
    summary
}

fn is_symmetric(tasks: &[Task], blocker: &str, blocked: &str) -> bool {
    let blocker_side = tasks
        .iter()
        .rev()
        .find(|t| t.id == blocker)
        .is_some_and(|t| t.blocks_id(blocked));
    let blocked_side = tasks
        .iter()
        .rev()
        .find(|t| t.id == blocked)
        .is_some_and(|t| t.depends_on_id(blocker));
    blocker_side && blocked_side
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
