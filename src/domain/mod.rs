//! Domain entities for specgit.
//!
//! This module contains the core business entities:
//! - Project: the project context the hidden repository lives in
//! - SpecPaths: translation among the three path coordinate spaces
//! - RepositoryHandle and status records for the hidden repository
//! - Conflict types for documentation generation

mod conflict;
mod paths;
mod project;
mod repo;

pub use conflict::{ConflictDecision, ConflictStrategy, ExistingDoc};
pub use paths::{ProjectPath, SpecPaths, SpecsPath};
pub use project::Project;
pub use repo::{CommitId, GitStatus, RepositoryHandle, RepositoryInfo};
