//! Validate-then-mutate orchestration over a task collection.
//!
//! # Overview
//!
//! [`Linker`] owns the [`PolicyConfig`] chosen at startup and runs the full
//! link protocol for callers that address tasks by id:
//!
//! 1. Resolve both ids in the current collection.
//! 2. Build a fresh [`TaskIndex`] snapshot.
//! 3. [`can_link`] (policy + domain gate), then [`find_cycle_path`].
//! 4. Commit with [`link_pair`] and write both copies back.
//!
//! Unlinking skips validation entirely: removing an edge can never violate
//! an invariant, and it must stay possible after a policy change.
//!
//! Sequencing across calls (and persisting the result) belongs to the
//! caller; each call validates against the collection it is handed.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::TetherError;
use crate::graph::cycles::{CycleWarning, find_cycle_path};
use crate::graph::index::{TaskIndex, TaskLookup};
use crate::graph::link::{link_pair, unlink_pair};
use crate::model::Task;
use crate::policy::{PolicyConfig, RejectReason, can_link};

/// Why [`Linker::check`] refused an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkRejection {
    Policy { reason: RejectReason },
    Cycle { warning: CycleWarning },
}

impl fmt::Display for LinkRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy { reason } => write!(f, "{reason}"),
            Self::Cycle { warning } => write!(f, "{warning}"),
        }
    }
}

/// Result of a successful [`Linker::link_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    Linked,
    AlreadyLinked,
}

/// Result of [`Linker::unlink_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlinkOutcome {
    Unlinked,
    NotLinked,
}

/// Runs the link protocol under an injected policy.
#[derive(Debug, Clone, Default)]
pub struct Linker {
    config: PolicyConfig,
}

impl Linker {
    #[must_use]
    pub const fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Validate `blocker → blocked` against the policy, then the cycle check.
    ///
    /// # Errors
    ///
    /// Returns the first rejection: policy failures take precedence over
    /// cycles.
    pub fn check<L: TaskLookup>(
        &self,
        blocker: &Task,
        blocked: &Task,
        lookup: &L,
    ) -> Result<(), LinkRejection> {
        can_link(blocker, blocked, &self.config)
            .into_result()
            .map_err(|reason| LinkRejection::Policy { reason })?;

        if let Some(warning) = find_cycle_path(lookup, &blocker.id, &blocked.id) {
            return Err(LinkRejection::Cycle { warning });
        }

        Ok(())
    }

    /// Validate and commit `blocker_id → blocked_id` inside `tasks`.
    ///
    /// # Errors
    ///
    /// - [`TetherError::TaskNotFound`] if either id is absent.
    /// - [`TetherError::LinkRejected`] on a policy rejection.
    /// - [`TetherError::CycleDetected`] if the edge would close a loop.
    #[instrument(skip(self, tasks), fields(policy = %self.config.policy))]
    pub fn link_in(
        &self,
        tasks: &mut [Task],
        blocker_id: &str,
        blocked_id: &str,
    ) -> Result<LinkOutcome, TetherError> {
        let (bi, di) = locate_pair(tasks, blocker_id, blocked_id)?;

        // A stored self edge is corrupt data, never an existing link.
        if bi == di {
            debug!("self link rejected");
            return Err(TetherError::LinkRejected {
                blocker: blocker_id.to_string(),
                blocked: blocked_id.to_string(),
                reason: RejectReason::SelfLink,
            });
        }

        if tasks[bi].blocks_id(blocked_id) && tasks[di].depends_on_id(blocker_id) {
            debug!("edge already present on both sides");
            return Ok(LinkOutcome::AlreadyLinked);
        }

        {
            let index = TaskIndex::from_tasks(tasks);
            self.check(&tasks[bi], &tasks[di], &index)
                .map_err(|rejection| {
                    debug!(%rejection, "link rejected");
                    match rejection {
                        LinkRejection::Policy { reason } => TetherError::LinkRejected {
                            blocker: blocker_id.to_string(),
                            blocked: blocked_id.to_string(),
                            reason,
                        },
                        LinkRejection::Cycle { warning } => TetherError::CycleDetected(warning),
                    }
                })?;
        }

        let pair = link_pair(&tasks[bi], &tasks[di]);
        tasks[bi] = pair.a;
        tasks[di] = pair.b;
        debug!("edge committed");
        Ok(LinkOutcome::Linked)
    }

    /// Remove `blocker_id → blocked_id` inside `tasks`, unconditionally.
    ///
    /// # Errors
    ///
    /// [`TetherError::TaskNotFound`] if either id is absent.
    #[instrument(skip(self, tasks))]
    pub fn unlink_in(
        &self,
        tasks: &mut [Task],
        blocker_id: &str,
        blocked_id: &str,
    ) -> Result<UnlinkOutcome, TetherError> {
        let (bi, di) = locate_pair(tasks, blocker_id, blocked_id)?;

        let present = tasks[bi].blocks_id(blocked_id) || tasks[di].depends_on_id(blocker_id);
        let pair = unlink_pair(&tasks[bi], &tasks[di]);
        tasks[bi] = pair.a;
        tasks[di] = pair.b;

        if present {
            debug!("edge removed");
            Ok(UnlinkOutcome::Unlinked)
        } else {
            Ok(UnlinkOutcome::NotLinked)
        }
    }
}

/// Positions of both endpoints. The last task with a given id wins, matching
/// [`TaskIndex::from_tasks`].
fn locate_pair(
    tasks: &[Task],
    blocker_id: &str,
    blocked_id: &str,
) -> Result<(usize, usize), TetherError> {
    let find = |id: &str| {
        tasks
            .iter()
            .rposition(|t| t.id == id)
            .ok_or_else(|| TetherError::TaskNotFound(id.to_string()))
    };
    let bi = find(blocker_id)?;
    let di = find(blocked_id)?;
    Ok((bi, di))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::LinkPolicy;

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("A").with_kind("Dev"),
            Task::new("B").with_kind("Dev"),
            Task::new("C").with_kind("Dev"),
            Task::new("D").with_kind("Design"),
        ]
    }

    fn linker() -> Linker {
        Linker::new(PolicyConfig::new(LinkPolicy::StrictSameKind))
    }

    fn get<'a>(tasks: &'a [Task], id: &str) -> &'a Task {
        tasks.iter().find(|t| t.id == id).unwrap()
    }

    #[test]
    fn link_in_writes_both_sides() {
        let mut tasks = tasks();
        let outcome = linker().link_in(&mut tasks, "A", "B").unwrap();
        assert_eq!(outcome, LinkOutcome::Linked);
        assert_eq!(get(&tasks, "A").blocks, vec!["B"]);
        assert_eq!(get(&tasks, "B").depends_on, vec!["A"]);
    }

    #[test]
    fn link_in_twice_reports_already_linked() {
        let mut tasks = tasks();
        let l = linker();
        l.link_in(&mut tasks, "A", "B").unwrap();
        assert_eq!(l.link_in(&mut tasks, "A", "B").unwrap(), LinkOutcome::AlreadyLinked);
        assert_eq!(get(&tasks, "A").blocks.len(), 1);
    }

    #[test]
    fn link_in_repairs_one_sided_edge() {
        let mut tasks = tasks();
        tasks[0].blocks.push("B".into());
        let outcome = linker().link_in(&mut tasks, "A", "B").unwrap();
        assert_eq!(outcome, LinkOutcome::Linked);
        assert_eq!(get(&tasks, "B").depends_on, vec!["A"]);
    }

    #[test]
    fn link_in_rejects_policy_violation() {
        let mut tasks = tasks();
        let err = linker().link_in(&mut tasks, "A", "D").unwrap_err();
        assert!(matches!(
            err,
            TetherError::LinkRejected {
                reason: RejectReason::MustShareKind,
                ..
            }
        ));
        assert!(get(&tasks, "A").blocks.is_empty());
    }

    #[test]
    fn link_in_rejects_cycle() {
        let mut tasks = tasks();
        let l = linker();
        l.link_in(&mut tasks, "A", "B").unwrap();
        l.link_in(&mut tasks, "B", "C").unwrap();
        let err = l.link_in(&mut tasks, "C", "A").unwrap_err();
        match err {
            TetherError::CycleDetected(w) => assert_eq!(w.cycle_path, vec!["C", "A", "B", "C"]),
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(get(&tasks, "C").blocks.is_empty());
    }

    #[test]
    fn self_link_rejected_even_when_stored() {
        let mut tasks = tasks();
        tasks[0].blocks.push("A".into());
        tasks[0].depends_on.push("A".into());
        let err = linker().link_in(&mut tasks, "A", "A").unwrap_err();
        assert!(matches!(
            err,
            TetherError::LinkRejected {
                reason: RejectReason::SelfLink,
                ..
            }
        ));
    }

    #[test]
    fn policy_rejection_wins_over_cycle() {
        let l = linker();
        let a = Task::new("A").with_kind("Dev");
        let rejection = l.check(&a, &a, &TaskIndex::default()).unwrap_err();
        assert_eq!(
            rejection,
            LinkRejection::Policy {
                reason: RejectReason::SelfLink
            }
        );
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut tasks = tasks();
        let err = linker().link_in(&mut tasks, "A", "nope").unwrap_err();
        assert_eq!(err, TetherError::TaskNotFound("nope".into()));
        let err = linker().unlink_in(&mut tasks, "nope", "A").unwrap_err();
        assert_eq!(err, TetherError::TaskNotFound("nope".into()));
    }

    #[test]
    fn unlink_ignores_policy() {
        let mut tasks = tasks();
        // Cross-kind edge that the strict policy would refuse.
        tasks[0].blocks.push("D".into());
        tasks[3].depends_on.push("A".into());
        let outcome = linker().unlink_in(&mut tasks, "A", "D").unwrap();
        assert_eq!(outcome, UnlinkOutcome::Unlinked);
        assert!(get(&tasks, "A").blocks.is_empty());
        assert!(get(&tasks, "D").depends_on.is_empty());
    }

    #[test]
    fn unlink_absent_edge_reports_not_linked() {
        let mut tasks = tasks();
        assert_eq!(
            linker().unlink_in(&mut tasks, "A", "B").unwrap(),
            UnlinkOutcome::NotLinked
        );
    }
}
