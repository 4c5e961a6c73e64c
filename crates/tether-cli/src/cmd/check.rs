//! `tt check`: dry-run the link protocol for one candidate edge.
//!
//! Prints the verdict plus the current neighbourhood of both endpoints. Exits
//! non-zero when the edge would be rejected.

use std::io::Write;

use clap::Args;
use serde::Serialize;

use tether_core::graph::index::{blockers_of, dependents_of};
use tether_core::{LinkPolicy, LinkRejection, Linker, Task, TaskIndex, TaskLookup};

use super::{CommandContext, find_task};
use crate::output::{pretty_kv, pretty_section, render};

/// Arguments for `tt check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// The task that would block.
    pub blocker: String,

    /// The task that would be blocked.
    pub blocked: String,
}

#[derive(Debug, Serialize)]
struct Neighbourhood {
    id: String,
    is_blocked: bool,
    blockers: Vec<String>,
    dependents: Vec<String>,
}

impl Neighbourhood {
    fn of<L: TaskLookup>(lookup: &L, task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            is_blocked: task.is_blocked(),
            blockers: ids(&blockers_of(lookup, &task.id)),
            dependents: ids(&dependents_of(lookup, &task.id)),
        }
    }
}

fn ids(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    ok: bool,
    blocker: String,
    blocked: String,
    policy: LinkPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<LinkRejection>,
    neighbourhood: Vec<Neighbourhood>,
}

pub fn run_check(args: &CheckArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let output = ctx.output;
    let tasks = ctx.store.load_or_report(output)?;
    let blocker = find_task(&tasks, &args.blocker, output)?;
    let blocked = find_task(&tasks, &args.blocked, output)?;

    let index = TaskIndex::from_tasks(&tasks);
    let linker = Linker::new(ctx.config.linking.clone());
    let rejection = linker.check(blocker, blocked, &index).err();

    let result = CheckOutput {
        ok: rejection.is_none(),
        blocker: blocker.id.clone(),
        blocked: blocked.id.clone(),
        policy: linker.config().policy,
        reason: rejection.as_ref().map(ToString::to_string),
        rejection,
        neighbourhood: vec![
            Neighbourhood::of(&index, blocker),
            Neighbourhood::of(&index, blocked),
        ],
    };

    render(output, &result, |r, w| {
        if output.is_pretty() {
            pretty_section(w, &format!("{} → {}", r.blocker, r.blocked))?;
            pretty_kv(w, "policy", r.policy.as_str())?;
            pretty_kv(
                w,
                "verdict",
                r.reason
                    .as_deref()
                    .map_or_else(|| "allowed".to_string(), |reason| format!("rejected ({reason})")),
            )?;
            for n in &r.neighbourhood {
                pretty_kv(
                    w,
                    &n.id,
                    format!(
                        "blocked by [{}], blocks [{}]",
                        n.blockers.join(", "),
                        n.dependents.join(", ")
                    ),
                )?;
            }
            Ok(())
        } else {
            match &r.reason {
                None => writeln!(w, "✓ {} may block {}", r.blocker, r.blocked),
                Some(reason) => writeln!(w, "✗ {} may not block {}: {reason}", r.blocker, r.blocked),
            }
        }
    })?;

    if let Some(reason) = result.reason {
        anyhow::bail!("link rejected: {reason}");
    }
    Ok(())
}
