//! Ranked link suggestions for a source task.
//!
//! # Overview
//!
//! Candidates are every task in the pool except the source (by id) and
//! archived tasks. Each is scored with [`relevance`], gated through
//! [`can_link`] with the source as blocker, sorted by descending total and
//! truncated to the requested limit.
//!
//! Sorting is stable and keyed only on the total, so equal scores keep the
//! pool's order. Cycle validity is not consulted: a suggestion is not a
//! promise that the link protocol will accept the edge.
//!
//! The policy is an explicit parameter; load it once from project config
//! and pass the same value here and to the linker.

use serde::Serialize;
use tether_core::{PolicyConfig, Task, can_link};
use tracing::{debug, instrument};

use crate::relevance::{RelevanceScore, relevance};

/// Number of suggestions returned when the caller does not ask otherwise.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// A ranked candidate with its score breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion<'a> {
    pub task: &'a Task,
    pub score: u32,
    pub breakdown: RelevanceScore,
}

/// Ranked candidates with their scores, best first.
#[must_use]
#[instrument(skip(source, all, config), fields(source = %source.id, pool = all.len()))]
pub fn suggest_scored<'a>(
    source: &Task,
    all: &'a [Task],
    limit: usize,
    config: &PolicyConfig,
) -> Vec<Suggestion<'a>> {
    let mut ranked: Vec<Suggestion<'a>> = all
        .iter()
        .filter(|t| t.id != source.id && !t.archived)
        .map(|t| {
            let breakdown = relevance(source, t);
            Suggestion {
                task: t,
                score: breakdown.total(),
                breakdown,
            }
        })
        .filter(|s| can_link(source, s.task, config).ok)
        .collect();

    let eligible = ranked.len();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    debug!(eligible, returned = ranked.len(), "ranked suggestions");
    ranked
}

/// Ranked candidate tasks, best first.
#[must_use]
pub fn suggest_candidates<'a>(
    source: &Task,
    all: &'a [Task],
    limit: usize,
    config: &PolicyConfig,
) -> Vec<&'a Task> {
    suggest_scored(source, all, limit, config)
        .into_iter()
        .map(|s| s.task)
        .collect()
}
