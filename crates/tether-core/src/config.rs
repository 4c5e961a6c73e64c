//! Project and user configuration.
//!
//! Project settings live in `<root>/.tether/config.toml`; per-user settings
//! live in `$XDG_CONFIG_HOME/tether/config.toml`. Both files are optional and
//! every section falls back to its defaults when absent.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::policy::PolicyConfig;

/// Directory (relative to the project root) holding tether state.
pub const TETHER_DIR: &str = ".tether";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub linking: PolicyConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestConfig {
    #[serde(default = "default_suggest_limit")]
    pub limit: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            limit: default_suggest_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_tasks_file")]
    pub tasks_file: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
        }
    }
}

impl StoreConfig {
    /// Task file path, resolved against `project_root` when relative.
    #[must_use]
    pub fn tasks_path(&self, project_root: &Path) -> PathBuf {
        if self.tasks_file.is_absolute() {
            self.tasks_file.clone()
        } else {
            project_root.join(&self.tasks_file)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Preferred output mode (`pretty`, `text`, `json`).
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
}

/// Load `<project_root>/.tether/config.toml`, or defaults when it is missing.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(TETHER_DIR).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the per-user config, or defaults when there is none.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("tether/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Project config plus user config.
///
/// # Errors
///
/// Propagates read and parse failures from either file.
pub fn resolve_config(project_root: &Path) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;
    Ok(EffectiveConfig { project, user })
}

const fn default_suggest_limit() -> usize {
    8
}

fn default_tasks_file() -> PathBuf {
    PathBuf::from(TETHER_DIR).join("tasks.json")
}
