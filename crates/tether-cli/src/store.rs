//! JSON task file: load, and atomic save.
//!
//! The file is a JSON array of task objects. Saving writes a sibling temp
//! file and renames it over the original, so readers never observe a
//! half-written array.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tether_core::Task;
use tether_core::error::ErrorCode;
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error};

#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole task file.
    pub fn load(&self) -> Result<Vec<Task>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let tasks: Vec<Task> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Load, rendering a coded error before bailing.
    pub fn load_or_report(&self, output: OutputMode) -> Result<Vec<Task>> {
        if !self.path.exists() {
            let code = ErrorCode::NotInitialized;
            let msg = format!("task file not found: {}", self.path.display());
            render_error(
                output,
                &CliError::with_details(&msg, code.hint().unwrap_or_default(), code.code()),
            )?;
            anyhow::bail!("{msg}");
        }
        match self.load() {
            Ok(tasks) => Ok(tasks),
            Err(e) => {
                let code = ErrorCode::TaskFileInvalid;
                render_error(
                    output,
                    &CliError::with_details(
                        format!("{e:#}"),
                        code.hint().unwrap_or_default(),
                        code.code(),
                    ),
                )?;
                Err(e)
            }
        }
    }

    /// Pretty-print `tasks` to a temp file next to the target, then rename.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let mut json = serde_json::to_string_pretty(tasks).context("Failed to serialize tasks")?;
        json.push('\n');

        let tmp = self.temp_path();
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp.display(),
                self.path.display()
            )
        })?;
        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Save, rendering a coded error before bailing.
    pub fn save_or_report(&self, tasks: &[Task], output: OutputMode) -> Result<()> {
        if let Err(e) = self.save(tasks) {
            let code = ErrorCode::TaskFileWriteFailed;
            render_error(
                output,
                &CliError::with_details(
                    format!("{e:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(e);
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
