//! Gitignore-style ignore matching for the hidden repository.
//!
//! Rules are ordered and the last matching rule wins, so a later `!`
//! negation can un-ignore a path matched by an earlier rule. Default
//! patterns are always present; `.specignore` lines are appended in file
//! order.

use regex::Regex;
use std::path::{Path, PathBuf};

/// Patterns that are always active, ahead of any `.specignore` rules
pub const DEFAULT_PATTERNS: &[&str] = &[
    ".git/",
    ".svn/",
    ".hg/",
    ".DS_Store",
    "Thumbs.db",
    "__pycache__/",
    "*.pyc",
    "node_modules/",
    "*.tmp",
    "*.swp",
    "*~",
];

/// One compiled ignore rule
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    /// Original pattern text, as written
    raw: String,
    matcher: Regex,
    /// `!`-prefixed rules un-ignore instead of ignoring
    negated: bool,
    /// Trailing-`/` rules match the directory and everything beneath it
    dir_only: bool,
    /// Rules containing `/` match the full relative path; others match
    /// path components at any depth
    anchored: bool,
}

impl IgnoreRule {
    /// Compile one pattern line; `None` for blanks and comments
    fn compile(line: &str) -> Option<Result<Self, regex::Error>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let raw = line.to_string();
        let (negated, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (dir_only, rest) = match rest.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        // A leading slash anchors to the ignore root
        let (anchored, rest) = match rest.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (rest.contains('/'), rest),
        };

        let mut re = String::from("^");
        let mut chars = rest.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '*' => re.push_str("[^/]*"),
                '?' => re.push_str("[^/]"),
                '/' => re.push('/'),
                '[' => {
                    // Character class: translated as-is and validated by
                    // the regex compiler, so an unbalanced bracket is a
                    // malformed rule
                    re.push('[');
                    if let Some('!') = chars.peek() {
                        re.push('^');
                        chars.next();
                    }
                    for c in chars.by_ref() {
                        if c == '\\' {
                            re.push_str("\\\\");
                        } else {
                            re.push(c);
                        }
                        if c == ']' {
                            break;
                        }
                    }
                }
                c => re.push_str(&regex::escape(&c.to_string())),
            }
        }
        if anchored && dir_only {
            // The directory itself, or anything nested beneath it
            re.push_str("(/.*)?");
        }
        re.push('$');

        Some(Regex::new(&re).map(|matcher| Self {
            raw,
            matcher,
            negated,
            dir_only,
            anchored,
        }))
    }

    /// Does this rule match a normalized relative path?
    fn matches(&self, path: &str) -> bool {
        if self.anchored {
            return self.matcher.is_match(path);
        }
        if self.dir_only {
            // Any component may name the ignored directory
            return path.split('/').any(|c| self.matcher.is_match(c));
        }
        // Filename component only, at any depth
        path.rsplit('/')
            .next()
            .is_some_and(|name| self.matcher.is_match(name))
    }
}

/// Compiled rule set loaded from defaults plus a `.specignore` file
#[derive(Debug)]
pub struct IgnoreService {
    ignore_file: PathBuf,
    rules: Vec<IgnoreRule>,
}

impl IgnoreService {
    /// Load defaults plus the ignore file (if present)
    pub fn load(ignore_file: PathBuf) -> Self {
        let rules = Self::compile_all(&ignore_file);
        Self { ignore_file, rules }
    }

    fn compile_all(ignore_file: &Path) -> Vec<IgnoreRule> {
        let mut rules = Vec::new();

        for pattern in DEFAULT_PATTERNS {
            if let Some(compiled) = IgnoreRule::compile(pattern) {
                rules.push(compiled.expect("default patterns are static and compile"));
            }
        }

        if let Ok(contents) = std::fs::read_to_string(ignore_file) {
            for line in contents.lines() {
                match IgnoreRule::compile(line) {
                    Some(Ok(rule)) => rules.push(rule),
                    Some(Err(e)) => {
                        // A bad custom rule must not disable the matcher
                        tracing::warn!(pattern = line, error = %e, "skipping malformed ignore rule");
                    }
                    None => {}
                }
            }
        }

        rules
    }

    /// Re-read defaults and the ignore file, replacing the rule set wholesale
    pub fn reload(&mut self) {
        self.rules = Self::compile_all(&self.ignore_file);
    }

    /// Whether a path is ignored, with gitignore last-match-wins semantics
    pub fn should_ignore(&self, path: impl AsRef<Path>) -> bool {
        let normalized = normalize(path.as_ref());
        let mut ignored = false;
        for rule in &self.rules {
            if rule.matches(&normalized) {
                ignored = !rule.negated;
            }
        }
        ignored
    }

    /// Order-preserving batch filter excluding ignored paths
    pub fn filter_paths<P: AsRef<Path>>(&self, paths: impl IntoIterator<Item = P>) -> Vec<P> {
        paths
            .into_iter()
            .filter(|p| !self.should_ignore(p.as_ref()))
            .collect()
    }

    /// Compile and append a single rule at runtime.
    ///
    /// Returns `false` without mutating state if the pattern fails to
    /// compile.
    pub fn add_runtime_pattern(&mut self, pattern: &str) -> bool {
        match IgnoreRule::compile(pattern) {
            Some(Ok(rule)) => {
                self.rules.push(rule);
                true
            }
            Some(Err(e)) => {
                tracing::warn!(pattern, error = %e, "rejecting runtime ignore pattern");
                false
            }
            None => false,
        }
    }

    /// The raw pattern texts, in matching order (defaults first)
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.raw.as_str())
    }
}

/// Normalize separators and strip `./` prefixes and trailing slashes
fn normalize(path: &Path) -> String {
    let mut s = path.to_string_lossy().replace('\\', "/");
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    while s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    s
}
