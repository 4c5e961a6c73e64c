//! `tt audit`: report edge invariant violations, optionally repairing them.
//!
//! Exits non-zero while findings remain.

use std::io::Write;

use clap::Args;
use serde::Serialize;

use tether_core::graph::audit::{AuditReport, Finding, RepairSummary, audit, repair};

use super::CommandContext;
use crate::output::{pretty_kv, pretty_section, render};

/// Arguments for `tt audit`.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Fix repairable findings and rewrite the task file.
    #[arg(long)]
    pub repair: bool,
}

#[derive(Debug, Serialize)]
struct AuditOutput {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    repaired: Option<RepairSummary>,
    report: AuditReport,
}

fn describe(finding: &Finding) -> String {
    match finding {
        Finding::SelfReference { id, side } => format!("{id}: self reference in {side:?}"),
        Finding::DuplicateEdge { id, target, side } => {
            format!("{id}: duplicate {target} in {side:?}")
        }
        Finding::DanglingReference { id, target, side } => {
            format!("{id}: unknown task {target} in {side:?}")
        }
        Finding::AsymmetricEdge {
            blocker,
            blocked,
            missing_on,
        } => format!("{blocker} → {blocked}: not recorded on {missing_on}"),
        Finding::DomainMismatch { blocker, blocked } => {
            format!("{blocker} → {blocked}: different domains")
        }
        Finding::Cycle { members } => format!("cycle: {}", members.join(", ")),
    }
}

pub fn run_audit(args: &AuditArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let output = ctx.output;
    let mut tasks = ctx.store.load_or_report(output)?;

    let repaired = if args.repair {
        let summary = repair(&mut tasks);
        if summary.total() > 0 {
            ctx.store.save_or_report(&tasks, output)?;
        }
        Some(summary)
    } else {
        None
    };

    let report = audit(&tasks);
    let result = AuditOutput {
        ok: report.is_clean(),
        repaired,
        report,
    };

    render(output, &result, |r, w| {
        if output.is_pretty() {
            pretty_section(w, "Audit")?;
            pretty_kv(w, "tasks", r.report.task_count.to_string())?;
            pretty_kv(w, "edges", r.report.edge_count.to_string())?;
        }
        if let Some(s) = &r.repaired {
            writeln!(
                w,
                "repaired: {} normalized, {} dangling dropped, {} mirrored, {} cyclic dropped",
                s.normalized, s.dangling_dropped, s.mirrored, s.cyclic_dropped
            )?;
        }
        if r.report.is_clean() {
            return writeln!(w, "✓ no findings");
        }
        for finding in &r.report.findings {
            let marker = if finding.is_repairable() { "fixable" } else { "manual" };
            writeln!(w, "✗ [{marker}] {}", describe(finding))?;
        }
        Ok(())
    })?;

    if !result.ok {
        anyhow::bail!("{} finding(s) remain", result.report.findings.len());
    }
    Ok(())
}
