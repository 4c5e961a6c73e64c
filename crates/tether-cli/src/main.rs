#![forbid(unsafe_code)]

mod cmd;
mod output;
mod store;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use tether_core::config::resolve_config;
use tether_core::error::ErrorCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::CommandContext;
use crate::store::TaskStore;

#[derive(Parser, Debug)]
#[command(
    name = "tt",
    author,
    version,
    about = "tether: task dependency links with policy and cycle checks",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Task file to operate on (defaults to `store.tasks_file` in config).
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Links",
        about = "Check whether one task may block another",
        long_about = "Run the policy and cycle checks for a candidate edge without writing anything.",
        after_help = "EXAMPLES:\n    # May t-1 block t-2?\n    tt check t-1 t-2\n\n    # Emit machine-readable output\n    tt check t-1 t-2 --json"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Links",
        about = "Make one task block another",
        long_about = "Validate the edge against the linking policy and the cycle check, then record it on both tasks.",
        after_help = "EXAMPLES:\n    # t-1 blocks t-2\n    tt link t-1 t-2\n\n    # Operate on a specific task file\n    tt --file board.json link t-1 t-2"
    )]
    Link(cmd::link::LinkArgs),

    #[command(
        next_help_heading = "Links",
        about = "Remove a blocking edge",
        long_about = "Remove the edge from both tasks. No policy check is applied.",
        after_help = "EXAMPLES:\n    # t-1 no longer blocks t-2\n    tt unlink t-1 t-2"
    )]
    Unlink(cmd::link::LinkArgs),

    #[command(
        next_help_heading = "Read",
        about = "Suggest tasks to link",
        long_about = "Rank the tasks the given task may block by shared domain, epic, kind and labels.",
        after_help = "EXAMPLES:\n    # Top suggestions for t-1\n    tt suggest t-1\n\n    # Only the best three\n    tt suggest t-1 --limit 3"
    )]
    Suggest(cmd::suggest::SuggestArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Audit edge invariants",
        long_about = "Report self references, duplicates, dangling ids, one-sided edges, domain mismatches and cycles.",
        after_help = "EXAMPLES:\n    # Report only\n    tt audit\n\n    # Fix what can be fixed and rewrite the task file\n    tt audit --repair"
    )]
    Audit(cmd::audit::AuditArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    tt completions bash > ~/.local/share/bash-completion/completions/tt"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TETHER_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tether=debug,info"
        } else {
            "tether=info,warn"
        })
    });

    let format = env::var("TETHER_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let config = match resolve_config(&project_root) {
        Ok(config) => config,
        Err(e) => {
            let code = ErrorCode::ConfigParseError;
            let mode = output::resolve_output_mode(cli.format, cli.json, None);
            output::render_error(
                mode,
                &CliError::with_details(
                    format!("{e:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(e);
        }
    };
    let output = output::resolve_output_mode(cli.format, cli.json, config.user.output.as_deref());

    let tasks_path = cli
        .file
        .clone()
        .unwrap_or_else(|| config.project.store.tasks_path(&project_root));
    let ctx = CommandContext {
        output,
        config: config.project,
        store: TaskStore::new(tasks_path),
    };
    debug!(
        policy = %ctx.config.linking.policy,
        file = %ctx.store.path().display(),
        ?output,
        "resolved context"
    );

    match &cli.command {
        Commands::Check(args) => cmd::check::run_check(args, &ctx),
        Commands::Link(args) => cmd::link::run_link(args, &ctx),
        Commands::Unlink(args) => cmd::link::run_unlink(args, &ctx),
        Commands::Suggest(args) => cmd::suggest::run_suggest(args, &ctx),
        Commands::Audit(args) => cmd::audit::run_audit(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_named_after_the_binary() {
        assert_eq!(Cli::command().get_name(), "tt");
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["tt", "check", "a", "b", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["tt", "--format", "text", "audit"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn file_flag_is_global() {
        let cli = Cli::parse_from(["tt", "link", "a", "b", "--file", "board.json"]);
        assert_eq!(cli.file, Some(PathBuf::from("board.json")));
    }

    #[test]
    fn verbose_flag_parsed() {
        let cli = Cli::parse_from(["tt", "-v", "audit"]);
        assert!(cli.verbose);
    }

    #[test]
    fn link_subcommand_parses() {
        let cli = Cli::parse_from(["tt", "link", "t-1", "t-2"]);
        match cli.command {
            Commands::Link(args) => {
                assert_eq!(args.blocker, "t-1");
                assert_eq!(args.blocked, "t-2");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn suggest_limit_is_optional() {
        let cli = Cli::parse_from(["tt", "suggest", "t-1"]);
        assert!(matches!(cli.command, Commands::Suggest(ref a) if a.limit.is_none()));

        let cli = Cli::parse_from(["tt", "suggest", "t-1", "-l", "3"]);
        assert!(matches!(cli.command, Commands::Suggest(ref a) if a.limit == Some(3)));
    }

    #[test]
    fn audit_repair_flag_parses() {
        let cli = Cli::parse_from(["tt", "audit", "--repair"]);
        assert!(matches!(cli.command, Commands::Audit(ref a) if a.repair));
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["tt", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn link_requires_two_ids() {
        assert!(Cli::try_parse_from(["tt", "link", "t-1"]).is_err());
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["tt", "check", "a", "b"],
            vec!["tt", "link", "a", "b"],
            vec!["tt", "unlink", "a", "b"],
            vec!["tt", "suggest", "a"],
            vec!["tt", "audit"],
            vec!["tt", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse: {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
