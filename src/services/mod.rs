//! Infrastructure services for specgit.
//!
//! This module contains:
//! - CommandRunner: blocking external-command execution seam
//! - SpecGit: facade over the git binary for the hidden repository
//! - IgnoreService: gitignore-style pattern matching
//! - Generator: documentation generation with conflict resolution

mod git;
pub mod generate;
pub mod ignore;
pub mod runner;
pub mod template;

pub use generate::{
    ConflictPrompter, GenAction, GenEntry, GenerateOptions, Generator, StdinPrompter,
    StrategyPrompter, HISTORY_DOC, INDEX_DOC,
};
pub use git::SpecGit;
pub use ignore::IgnoreService;
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
