//! Path space translation for the hidden spec repository.
//!
//! Three coordinate spaces are in play: project-root-relative paths,
//! `.specs/`-prefixed documentation paths, and worktree-relative paths
//! (the only form ever handed to the external git binary). All
//! comparisons happen on normalized, `/`-separated strings so behavior
//! is identical across platforms.

use crate::error::{PathError, PathResult};
use std::path::{Path, PathBuf};

/// A path guaranteed relative to, and contained within, the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPath(PathBuf);

impl ProjectPath {
    /// The root-relative path
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// The root-relative path as a normalized string
    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }
}

impl std::fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A project path known to live under the documentation root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecsPath(String);

impl SpecsPath {
    /// The `.specs/`-prefixed relative path
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpecsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Translator among the three path spaces.
///
/// Owns no mutable state; all methods are pure functions over the
/// configured roots.
#[derive(Debug, Clone)]
pub struct SpecPaths {
    project_root: PathBuf,
    specs_root: PathBuf,
    /// Worktree directory name relative to the root, e.g. ".specs"
    prefix: String,
}

impl SpecPaths {
    /// Create a translator for a project root and worktree prefix
    pub fn new(project_root: PathBuf, prefix: &str) -> Self {
        let specs_root = project_root.join(prefix);
        Self {
            project_root,
            specs_root,
            prefix: prefix.to_string(),
        }
    }

    /// The absolute documentation root (`<project>/.specs`)
    pub fn specs_root(&self) -> &Path {
        &self.specs_root
    }

    /// The absolute project root
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Convert any supported input form to a worktree-relative path.
    ///
    /// Absolute paths under the documentation root are made relative to
    /// it; absolute paths outside it are returned unchanged (legacy
    /// pass-through). A `.specs/` prefix on relative input is stripped.
    pub fn to_worktree_path(&self, input: impl AsRef<Path>) -> String {
        let input = input.as_ref();
        let s = normalize(input);

        if input.is_absolute() {
            let root = normalize(&self.specs_root);
            if s == root {
                return String::new();
            }
            if let Some(rest) = s.strip_prefix(&format!("{}/", root)) {
                return rest.to_string();
            }
            tracing::debug!(path = %s, "absolute path outside the docs root passed through untranslated");
            return s;
        }

        if s == self.prefix {
            return String::new();
        }
        if let Some(rest) = s.strip_prefix(&format!("{}/", self.prefix)) {
            return rest.to_string();
        }
        s
    }

    /// Convert a worktree-relative path to its `.specs/`-prefixed form.
    ///
    /// Idempotent: already-prefixed input is returned as-is.
    pub fn from_worktree_path(&self, input: impl AsRef<Path>) -> SpecsPath {
        let s = normalize(input.as_ref());
        if s.is_empty() || s == self.prefix {
            return SpecsPath(self.prefix.clone());
        }
        if s.starts_with(&format!("{}/", self.prefix)) {
            return SpecsPath(s);
        }
        SpecsPath(format!("{}/{}", self.prefix, s))
    }

    /// Compose the documentation root with the worktree-relative form of
    /// the input; always absolute.
    pub fn to_absolute_specs_path(&self, input: impl AsRef<Path>) -> PathBuf {
        let rel = self.to_worktree_path(input);
        if rel.is_empty() {
            self.specs_root.clone()
        } else {
            self.specs_root.join(rel)
        }
    }

    /// Check whether a path lies under the documentation root.
    ///
    /// Relative inputs are interpreted as already relative to the docs
    /// root, so they qualify unless they escape via `..`. Absolute
    /// inputs get a strict containment check.
    pub fn is_under_specs_root(&self, input: impl AsRef<Path>) -> bool {
        let input = input.as_ref();
        let s = normalize(input);

        if input.is_absolute() {
            let root = normalize(&self.specs_root);
            return s == root || s.starts_with(&format!("{}/", root));
        }

        resolve_relative(&s).is_some()
    }

    /// The single safety gate for user-supplied paths: fails closed if
    /// the path resolves outside the project root.
    pub fn ensure_within_project_root(&self, input: impl AsRef<Path>) -> PathResult<ProjectPath> {
        let input = input.as_ref();
        let s = normalize(input);

        let rel = if input.is_absolute() {
            let resolved = resolve_absolute(&s);
            let root = resolve_absolute(&normalize(&self.project_root));
            if resolved == root {
                String::new()
            } else {
                match resolved.strip_prefix(&format!("{}/", root)) {
                    Some(rest) => rest.to_string(),
                    None => return Err(PathError::OutsideProjectRoot(input.to_path_buf())),
                }
            }
        } else {
            match resolve_relative(&s) {
                Some(parts) => parts.join("/"),
                None => return Err(PathError::OutsideProjectRoot(input.to_path_buf())),
            }
        };

        Ok(ProjectPath(PathBuf::from(rel)))
    }

    /// Derive the documentation directory for a source file: the source's
    /// directory structure is mirrored under the docs root and the file
    /// name is replaced by a per-file directory.
    ///
    /// `src/models.py` → `.specs/src/models`
    pub fn spec_dir_for_source(&self, source: impl AsRef<Path>) -> PathResult<SpecsPath> {
        let source = source.as_ref();
        let project_path = self.ensure_within_project_root(source)?;
        let rel = project_path.as_path();

        let stem = rel
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PathError::NoFileName(source.to_path_buf()))?;

        let parent = rel.parent().map(normalize).unwrap_or_default();
        let worktree_rel = if parent.is_empty() {
            stem.to_string()
        } else {
            format!("{}/{}", parent, stem)
        };

        Ok(self.from_worktree_path(worktree_rel))
    }
}

/// Normalize separators to `/` and strip `./` prefixes and trailing slashes
fn normalize(path: &Path) -> String {
    let mut s = path.to_string_lossy().replace('\\', "/");
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    while s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    if s == "." {
        return String::new();
    }
    s
}

/// Lexically resolve a relative path; `None` if it escapes upward
fn resolve_relative(s: &str) -> Option<Vec<&str>> {
    let mut out = Vec::new();
    for comp in s.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                out.pop()?;
            }
            c => out.push(c),
        }
    }
    Some(out)
}

/// Lexically resolve an absolute path (`..` never climbs past `/`)
fn resolve_absolute(s: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for comp in s.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            c => out.push(c),
        }
    }
    format!("/{}", out.join("/"))
}
