//! Project entity representing the overall repository context.

use crate::config::ProjectConfig;
use std::path::PathBuf;

/// Represents the project a hidden spec repository lives in
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root path
    pub root_path: PathBuf,
    /// Documentation worktree root (absolute, default `.specs`)
    pub specs_root: PathBuf,
    /// Bare object-store directory (absolute, default `.spec`)
    pub git_dir: PathBuf,
    /// Index file for the hidden repository (absolute, default `.spec-index`)
    pub index_file: PathBuf,
    /// Ignore-rule file (absolute, default `.specignore`)
    pub ignore_file: PathBuf,
    /// Loaded configuration
    pub config: ProjectConfig,
}

impl Project {
    /// Create a new Project from a root path and configuration
    pub fn new(root_path: PathBuf, config: ProjectConfig) -> Self {
        let specs_root = root_path.join(&config.layout.work_tree);
        let git_dir = root_path.join(&config.layout.git_dir);
        let index_file = root_path.join(&config.layout.index_file);
        let ignore_file = root_path.join(&config.layout.ignore_file);

        Self {
            root_path,
            specs_root,
            git_dir,
            index_file,
            ignore_file,
            config,
        }
    }

    /// Discover the project root by walking up from the start directory.
    ///
    /// A directory counts as a project root if it contains an existing spec
    /// repository (`.spec/`) or the primary repository marker (`.git`).
    pub fn discover(start_path: Option<PathBuf>) -> Option<PathBuf> {
        let start = start_path
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let mut current = start.as_path();
        loop {
            if current.join(".spec").is_dir() || current.join(".git").exists() {
                return Some(current.to_path_buf());
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// The worktree directory name relative to the root (e.g. ".specs")
    pub fn specs_prefix(&self) -> &str {
        &self.config.layout.work_tree
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_new() {
        let config = ProjectConfig::default();
        let project = Project::new(PathBuf::from("/tmp/test-project"), config);

        assert_eq!(project.root_path, PathBuf::from("/tmp/test-project"));
        assert_eq!(project.specs_root, PathBuf::from("/tmp/test-project/.specs"));
        assert_eq!(project.git_dir, PathBuf::from("/tmp/test-project/.spec"));
        assert_eq!(
            project.index_file,
            PathBuf::from("/tmp/test-project/.spec-index")
        );
        assert_eq!(
            project.ignore_file,
            PathBuf::from("/tmp/test-project/.specignore")
        );
    }

    #[test]
    fn test_discover_finds_spec_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        std::fs::create_dir_all(root.join(".spec")).unwrap();
        let nested = root.join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();

        let found = Project::discover(Some(nested)).unwrap();
        assert_eq!(found, root);
    }
}
