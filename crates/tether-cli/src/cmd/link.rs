//! `tt link` / `tt unlink`: commit or remove a blocking edge.
//!
//! Both rewrite the task file only when something changed.

use std::io::Write;

use clap::Args;
use serde::Serialize;

use tether_core::{LinkOutcome, Linker, UnlinkOutcome};

use super::CommandContext;
use crate::output::{CliError, render, render_error};

/// Arguments for `tt link` and `tt unlink`.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// The blocking task.
    pub blocker: String,

    /// The blocked task.
    pub blocked: String,
}

#[derive(Debug, Serialize)]
struct LinkOutput<O> {
    ok: bool,
    blocker: String,
    blocked: String,
    outcome: O,
}

pub fn run_link(args: &LinkArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let output = ctx.output;
    let mut tasks = ctx.store.load_or_report(output)?;
    let linker = Linker::new(ctx.config.linking.clone());

    let outcome = match linker.link_in(&mut tasks, &args.blocker, &args.blocked) {
        Ok(outcome) => outcome,
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            return Err(e.into());
        }
    };

    if outcome == LinkOutcome::Linked {
        ctx.store.save_or_report(&tasks, output)?;
    }

    let result = LinkOutput {
        ok: true,
        blocker: args.blocker.clone(),
        blocked: args.blocked.clone(),
        outcome,
    };
    render(output, &result, |r, w| match r.outcome {
        LinkOutcome::Linked => writeln!(w, "✓ {} blocks {}", r.blocker, r.blocked),
        LinkOutcome::AlreadyLinked => {
            writeln!(w, "✓ {} already blocks {}", r.blocker, r.blocked)
        }
    })
}

pub fn run_unlink(args: &LinkArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let output = ctx.output;
    let mut tasks = ctx.store.load_or_report(output)?;
    let linker = Linker::new(ctx.config.linking.clone());

    let outcome = match linker.unlink_in(&mut tasks, &args.blocker, &args.blocked) {
        Ok(outcome) => outcome,
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            return Err(e.into());
        }
    };

    if outcome == UnlinkOutcome::Unlinked {
        ctx.store.save_or_report(&tasks, output)?;
    }

    let result = LinkOutput {
        ok: true,
        blocker: args.blocker.clone(),
        blocked: args.blocked.clone(),
        outcome,
    };
    render(output, &result, |r, w| match r.outcome {
        UnlinkOutcome::Unlinked => writeln!(w, "✓ {} no longer blocks {}", r.blocker, r.blocked),
        UnlinkOutcome::NotLinked => {
            writeln!(w, "✓ {} did not block {}", r.blocker, r.blocked)
        }
    })
}
