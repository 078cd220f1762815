//! specgit: hidden version-control history for generated documentation
//!
//! This crate maintains a second, hidden git history for generated spec
//! documents, kept separate from a project's primary repository while
//! presenting the documents under a conventional `.specs/` directory.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;

pub use config::ProjectConfig;
pub use error::{AppError, Result};
