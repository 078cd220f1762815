//! Hidden-repository entities and status records.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The three filesystem locations that together form the hidden repository.
///
/// Created once per process from the project configuration; read-only
/// afterwards. These are the only addressing parameters the external git
/// binary ever sees, so its ambient repository discovery never kicks in.
#[derive(Debug, Clone)]
pub struct RepositoryHandle {
    /// Bare object-store directory (`.spec/`)
    pub git_dir: PathBuf,
    /// Documentation worktree (`.specs/`)
    pub work_tree: PathBuf,
    /// Index file (`.spec-index`)
    pub index_file: PathBuf,
}

impl RepositoryHandle {
    /// Create a handle from the three locations
    pub fn new(git_dir: PathBuf, work_tree: PathBuf, index_file: PathBuf) -> Self {
        Self {
            git_dir,
            work_tree,
            index_file,
        }
    }

    /// Environment variables redirecting git away from ambient discovery
    pub fn env(&self) -> Vec<(String, String)> {
        vec![
            ("GIT_DIR".to_string(), self.git_dir.display().to_string()),
            (
                "GIT_WORK_TREE".to_string(),
                self.work_tree.display().to_string(),
            ),
            (
                "GIT_INDEX_FILE".to_string(),
                self.index_file.display().to_string(),
            ),
        ]
    }
}

/// A commit revision identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitId(String);

impl CommitId {
    /// Wrap a revision id reported by git
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The full revision id
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated id for display
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(7)]
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Working-tree status of the hidden repository, bucketed by state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitStatus {
    /// Paths staged for the next commit
    pub staged: Vec<String>,
    /// Paths modified but not staged
    pub modified: Vec<String>,
    /// Paths not yet tracked
    pub untracked: Vec<String>,
}

impl GitStatus {
    /// True when nothing is staged, modified, or untracked
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.modified.is_empty() && self.untracked.is_empty()
    }
}

/// Diagnostic snapshot of the hidden repository.
///
/// Produced by a read-only status query that never fails: internal errors
/// land in `error` instead of propagating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub initialized: bool,
    pub git_dir: PathBuf,
    pub work_tree: PathBuf,
    pub index_file: PathBuf,
    pub git_dir_exists: bool,
    pub work_tree_exists: bool,
    pub index_exists: bool,
    pub error: Option<String>,
}

impl RepositoryInfo {
    /// Render one location line for diagnostics output
    fn describe(path: &Path, exists: bool) -> String {
        format!(
            "{} ({})",
            path.display(),
            if exists { "exists" } else { "missing" }
        )
    }
}

impl std::fmt::Display for RepositoryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "initialized: {}",
            if self.initialized { "yes" } else { "no" }
        )?;
        writeln!(
            f,
            "object store: {}",
            Self::describe(&self.git_dir, self.git_dir_exists)
        )?;
        writeln!(
            f,
            "worktree:     {}",
            Self::describe(&self.work_tree, self.work_tree_exists)
        )?;
        write!(
            f,
            "index:        {}",
            Self::describe(&self.index_file, self.index_exists)
        )?;
        if let Some(err) = &self.error {
            write!(f, "\nerror: {}", err)?;
        }
        Ok(())
    }
}
