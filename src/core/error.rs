//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`GitLauncherError`] which covers every failure mode of
//! the resolve → branch → lifecycle → launch pipeline. It uses `thiserror` for
//! ergonomic error definitions and includes constructors for the common cases.
//!
//! # Public API
//! - [`GitLauncherError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, GitLauncherError>`
//!
//! # Error Categories
//! - **Pipeline**: resolution, branch selection, git operations, launch
//! - **Configuration**: malformed config (warning only), unknown provider alias
//! - **Selection parsing**: invalid index input for multi-selection prompts
//! - **Infrastructure**: I/O, JSON and git2 errors

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for git-launcher
#[derive(Error, Debug)]
pub enum GitLauncherError {
    // Pipeline errors
    #[error("Could not resolve repository: {0}")]
    Resolution(String),

    #[error("Branch selection failed: {0}")]
    BranchSelection(String),

    #[error("`{command}` failed: {stderr}")]
    GitOperation { command: String, stderr: String },

    #[error("Launch command `{command}` exited with {}", .code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    Launch { command: String, code: Option<i32> },

    #[error("Repository is not cached: {name}")]
    NotCached { name: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown provider '{name}'. Run 'git-launcher config' to list providers")]
    UnknownProvider { name: String },

    #[error("Could not find cache directory")]
    CacheHomeNotFound,

    #[error("Repository directory '{path}' is not a git checkout")]
    NotACheckout { path: PathBuf },

    // Selection parsing errors
    #[error("Invalid range format: '{range}'. Use format like '3-6'")]
    InvalidRangeFormat { range: String },

    #[error("Invalid number in range: '{number}'")]
    InvalidRangeNumber { number: String },

    #[error("Invalid range: start ({start}) must be <= end ({end})")]
    InvalidRangeOrder { start: usize, end: usize },

    #[error("Invalid number: '{number}'")]
    InvalidNumber { number: String },

    #[error("Index must be positive (got 0)")]
    ZeroIndex,

    #[error("Index {index} is out of range (1-{max} available)")]
    IndexOutOfRange { index: usize, max: usize },

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git repository error: {0}")]
    GitRepo(#[from] git2::Error),
}

/// Convenience type alias for Results using GitLauncherError
pub type Result<T> = std::result::Result<T, GitLauncherError>;

impl GitLauncherError {
    /// Create a resolution error with a specific message
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    /// Create a branch selection error with a specific message
    pub fn branch_selection(message: impl Into<String>) -> Self {
        Self::BranchSelection(message.into())
    }

    /// Create a git operation error from the command line and its stderr
    pub fn git_operation(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::GitOperation {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a launch error from the command and its exit code
    pub fn launch(command: impl Into<String>, code: Option<i32>) -> Self {
        Self::Launch {
            command: command.into(),
            code,
        }
    }

    /// Create a configuration error with a specific message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider { name: name.into() }
    }

    pub fn not_cached(name: impl Into<String>) -> Self {
        Self::NotCached { name: name.into() }
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, max: usize) -> Self {
        Self::IndexOutOfRange { index, max }
    }

    /// Create an invalid range format error
    pub fn invalid_range_format(range: impl Into<String>) -> Self {
        Self::InvalidRangeFormat {
            range: range.into(),
        }
    }

    /// Create an invalid range number error
    pub fn invalid_range_number(number: impl Into<String>) -> Self {
        Self::InvalidRangeNumber {
            number: number.into(),
        }
    }

    /// Create an invalid range order error
    pub fn invalid_range_order(start: usize, end: usize) -> Self {
        Self::InvalidRangeOrder { start, end }
    }

    /// Create an invalid number error
    pub fn invalid_number(number: impl Into<String>) -> Self {
        Self::InvalidNumber {
            number: number.into(),
        }
    }

    /// Whether the error came from the user aborting an interactive prompt
    pub fn is_canceled(&self) -> bool {
        match self {
            Self::Resolution(msg) | Self::BranchSelection(msg) => msg == "canceled",
            _ => false,
        }
    }
}
