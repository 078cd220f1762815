//! Unified error types for specgit.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Generation error: {0}")]
    Gen(#[from] GenError),
}

impl AppError {
    /// Whether this error represents a user-requested abort rather than a failure.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Gen(GenError::Aborted))
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Path translation and containment errors
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Path escapes the project root: {0}")]
    OutsideProjectRoot(PathBuf),

    #[error("Path has no file name component: {0}")]
    NoFileName(PathBuf),
}

/// Hidden-repository operation errors
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Spec repository not initialized (run `specgit init` first)")]
    NotInitialized,

    #[error("No write permission for {0}")]
    PermissionDenied(PathBuf),

    #[error("git {command} failed: {stderr}")]
    Tool { command: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Build a [`GitError::Tool`] from the verb and the binary's stderr.
    pub fn tool(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Tool {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

/// Documentation-generation errors
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Generation aborted")]
    Aborted,

    #[error("Backup of {path} failed: {source}")]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for path operations
pub type PathResult<T> = std::result::Result<T, PathError>;

/// Result type alias for hidden-repository operations
pub type GitResult<T> = std::result::Result<T, GitError>;

/// Result type alias for generation operations
pub type GenResult<T> = std::result::Result<T, GenError>;
