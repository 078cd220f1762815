//! Conflict resolution types for documentation generation.

use std::path::PathBuf;
use std::time::SystemTime;

/// Terminal outcome of conflict resolution for one documentation directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// No conflicting files; generate normally
    Proceed,
    /// Replace the existing files
    Overwrite,
    /// Copy existing files aside with a timestamp suffix, then generate
    Backup,
    /// Leave existing files untouched; skip generation for this directory
    Skip,
    /// Unwind the entire batch operation
    Abort,
}

impl std::fmt::Display for ConflictDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Proceed => "proceed",
            Self::Overwrite => "overwrite",
            Self::Backup => "backup",
            Self::Skip => "skip",
            Self::Abort => "abort",
        };
        write!(f, "{}", s)
    }
}

/// Caller-selected policy for handling pre-existing generated files
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConflictStrategy {
    Backup,
    Overwrite,
    Skip,
    Fail,
}

impl ConflictStrategy {
    /// The decision this strategy forces when a conflict exists
    pub fn decision(&self) -> ConflictDecision {
        match self {
            Self::Backup => ConflictDecision::Backup,
            Self::Overwrite => ConflictDecision::Overwrite,
            Self::Skip => ConflictDecision::Skip,
            Self::Fail => ConflictDecision::Abort,
        }
    }

    /// Parse a strategy name from configuration ("" means unset)
    pub fn from_config(name: &str) -> Option<Self> {
        match name {
            "backup" => Some(Self::Backup),
            "overwrite" => Some(Self::Overwrite),
            "skip" => Some(Self::Skip),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Metadata for a pre-existing generated file, shown during prompting
#[derive(Debug, Clone)]
pub struct ExistingDoc {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl ExistingDoc {
    /// Inspect a file on disk; `None` if it does not exist
    pub fn inspect(path: PathBuf) -> Option<Self> {
        let meta = std::fs::metadata(&path).ok()?;
        if !meta.is_file() {
            return None;
        }
        Some(Self {
            size: meta.len(),
            modified: meta.modified().ok(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_decisions() {
        assert_eq!(ConflictStrategy::Backup.decision(), ConflictDecision::Backup);
        assert_eq!(
            ConflictStrategy::Overwrite.decision(),
            ConflictDecision::Overwrite
        );
        assert_eq!(ConflictStrategy::Skip.decision(), ConflictDecision::Skip);
        assert_eq!(ConflictStrategy::Fail.decision(), ConflictDecision::Abort);
    }

    #[test]
    fn test_strategy_from_config() {
        assert_eq!(
            ConflictStrategy::from_config("backup"),
            Some(ConflictStrategy::Backup)
        );
        assert_eq!(ConflictStrategy::from_config(""), None);
        assert_eq!(ConflictStrategy::from_config("bogus"), None);
    }
}
