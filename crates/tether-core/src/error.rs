use std::fmt;

use thiserror::Error;

use crate::graph::cycles::CycleWarning;
use crate::policy::RejectReason;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    TaskNotFound,
    LinkRejected,
    CycleDetected,
    TaskFileInvalid,
    TaskFileWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::TaskNotFound => "E2001",
            Self::LinkRejected => "E2002",
            Self::CycleDetected => "E2003",
            Self::TaskFileInvalid => "E3001",
            Self::TaskFileWriteFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Task file not found",
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::LinkRejected => "Link rejected by policy",
            Self::CycleDetected => "Cycle would be created",
            Self::TaskFileInvalid => "Task file is not valid JSON",
            Self::TaskFileWriteFailed => "Task file write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Pass --file or set store.tasks_file in .tether/config.toml."),
            Self::ConfigParseError => Some("Fix the TOML syntax in the reported config file and retry."),
            Self::TaskNotFound => Some("Check the id against the task file."),
            Self::LinkRejected => {
                Some("Pick tasks that share a kind or epic, or adjust linking.policy.")
            }
            Self::CycleDetected => Some("Remove/adjust dependency links to keep the graph acyclic."),
            Self::TaskFileInvalid => Some("The task file must hold a JSON array of task objects."),
            Self::TaskFileWriteFailed => Some("Check disk space and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the linking orchestration layer.
///
/// The pure engine functions (`can_link`, `would_create_cycle`, the link
/// mutators, the ranker) never fail; these cover the cases where a caller
/// names tasks by id and one of the checks refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TetherError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("cannot link '{blocker}' → '{blocked}': {reason}")]
    LinkRejected {
        blocker: String,
        blocked: String,
        reason: RejectReason,
    },

    #[error("{0}")]
    CycleDetected(CycleWarning),
}

impl TetherError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::TaskNotFound(_) => ErrorCode::TaskNotFound,
            Self::LinkRejected { .. } => ErrorCode::LinkRejected,
            Self::CycleDetected(_) => ErrorCode::CycleDetected,
        }
    }

    /// Remediation text for the error's code.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code()
            .hint()
            .unwrap_or_else(|| self.error_code().message())
            .to_string()
    }
}
