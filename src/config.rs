//! Configuration management for specgit.
//!
//! Supports layered configuration: defaults → project → user → env

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub git: GitConfig,
}

impl ProjectConfig {
    /// Load configuration with hierarchy: defaults → project → user → env
    pub fn load(project_root: Option<&PathBuf>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. Project-specific config (.specgit.toml in project root)
        if let Some(root) = project_root {
            let project_config = root.join(".specgit.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        // 3. User config (~/.config/specgit/config.toml)
        if let Some(config_dir) = directories::ProjectDirs::from("com", "specgit", "specgit") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 4. Environment variables (SPECGIT_*)
        builder = builder.add_source(
            Environment::with_prefix("SPECGIT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Filesystem layout of the hidden repository, relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Bare object-store directory
    #[serde(default = "default_git_dir")]
    pub git_dir: String,
    /// Documentation worktree directory
    #[serde(default = "default_work_tree")]
    pub work_tree: String,
    /// Index file for the hidden repository
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Ignore-rule file consulted by the matcher
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            git_dir: default_git_dir(),
            work_tree: default_work_tree(),
            index_file: default_index_file(),
            ignore_file: default_ignore_file(),
        }
    }
}

fn default_git_dir() -> String {
    ".spec".to_string()
}

fn default_work_tree() -> String {
    ".specs".to_string()
}

fn default_index_file() -> String {
    ".spec-index".to_string()
}

fn default_ignore_file() -> String {
    ".specignore".to_string()
}

/// Documentation-generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Template name used for the index document
    #[serde(default = "default_template")]
    pub template: String,
    /// Conflict strategy applied when no `--conflict-strategy` flag is given
    /// (empty string means prompt interactively)
    #[serde(default)]
    pub conflict_strategy: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            conflict_strategy: String::new(),
        }
    }
}

fn default_template() -> String {
    "default".to_string()
}

/// External git binary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Name or path of the git executable
    #[serde(default = "default_git_binary")]
    pub binary: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: default_git_binary(),
        }
    }
}

fn default_git_binary() -> String {
    "git".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.layout.git_dir, ".spec");
        assert_eq!(config.layout.work_tree, ".specs");
        assert_eq!(config.layout.index_file, ".spec-index");
        assert_eq!(config.layout.ignore_file, ".specignore");
        assert_eq!(config.generate.template, "default");
        assert!(config.generate.conflict_strategy.is_empty());
        assert_eq!(config.git.binary, "git");
    }
}
