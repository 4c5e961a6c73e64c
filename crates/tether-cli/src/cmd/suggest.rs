//! `tt suggest`: ranked link candidates for a task.

use std::io::Write;

use clap::Args;
use serde::Serialize;

use tether_core::LinkPolicy;
use tether_search::{RelevanceScore, suggest_scored};

use super::{CommandContext, find_task};
use crate::output::{pretty_section, render};

/// Arguments for `tt suggest`.
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Task to find blocking candidates for (it would be the blocker).
    pub id: String,

    /// Maximum number of suggestions (defaults to `suggest.limit` in config).
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SuggestionRow {
    id: String,
    score: u32,
    breakdown: RelevanceScore,
}

#[derive(Debug, Serialize)]
struct SuggestOutput {
    source_id: String,
    policy: LinkPolicy,
    count: usize,
    results: Vec<SuggestionRow>,
}

pub fn run_suggest(args: &SuggestArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let output = ctx.output;
    let tasks = ctx.store.load_or_report(output)?;
    let source = find_task(&tasks, &args.id, output)?;
    let limit = args.limit.unwrap_or(ctx.config.suggest.limit);

    let results: Vec<SuggestionRow> = suggest_scored(source, &tasks, limit, &ctx.config.linking)
        .into_iter()
        .map(|s| SuggestionRow {
            id: s.task.id.clone(),
            score: s.score,
            breakdown: s.breakdown,
        })
        .collect();

    let result = SuggestOutput {
        source_id: source.id.clone(),
        policy: ctx.config.linking.policy,
        count: results.len(),
        results,
    };

    render(output, &result, |r, w| {
        if output.is_pretty() {
            pretty_section(w, &format!("Suggestions for {} ({})", r.source_id, r.policy))?;
        }
        if r.results.is_empty() {
            return writeln!(w, "no candidates");
        }
        for row in &r.results {
            let b = &row.breakdown;
            writeln!(
                w,
                "{:>4}  {}  (domain {}, epic {}, kind {}, labels {})",
                row.score, row.id, b.domain, b.epic, b.kind, b.shared_labels
            )?;
        }
        Ok(())
    })
}
