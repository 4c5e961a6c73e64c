pub mod audit;
pub mod check;
pub mod completions;
pub mod link;
pub mod suggest;

use tether_core::Task;
use tether_core::config::ProjectConfig;
use tether_core::error::TetherError;

use crate::output::{CliError, OutputMode, render_error};
use crate::store::TaskStore;

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct CommandContext {
    pub output: OutputMode,
    pub config: ProjectConfig,
    pub store: TaskStore,
}

/// Look up `id`, rendering a `TaskNotFound` error if it is absent.
///
/// Duplicate ids resolve to the last occurrence, matching the index.
pub fn find_task<'a>(tasks: &'a [Task], id: &str, output: OutputMode) -> anyhow::Result<&'a Task> {
    if let Some(task) = tasks.iter().rev().find(|t| t.id == id) {
        return Ok(task);
    }
    let err = TetherError::TaskNotFound(id.to_string());
    render_error(output, &CliError::from(&err))?;
    Err(err.into())
}
