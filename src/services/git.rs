//! Facade over the external git binary for the hidden spec repository.
//!
//! Every invocation carries the three addressing parameters from the
//! [`RepositoryHandle`] so git never falls back to ambient repository
//! discovery and touches the project's primary repository. All
//! operations are blocking subprocess calls through a [`CommandRunner`].

use crate::domain::{CommitId, GitStatus, Project, RepositoryHandle, RepositoryInfo, SpecPaths};
use crate::error::{GitError, GitResult};
use crate::services::ignore::IgnoreService;
use crate::services::runner::{CommandOutput, CommandRunner, SystemRunner};
use std::path::{Path, PathBuf};

/// Dual-repository facade: git verbs against the hidden spec repository
pub struct SpecGit {
    handle: RepositoryHandle,
    paths: SpecPaths,
    project_root: PathBuf,
    ignore_file: PathBuf,
    binary: String,
    runner: Box<dyn CommandRunner>,
}

impl SpecGit {
    /// Create a facade for a project, using the system git binary
    pub fn new(project: &Project) -> Self {
        Self::with_runner(project, Box::new(SystemRunner))
    }

    /// Create a facade with an explicit runner (used by tests)
    pub fn with_runner(project: &Project, runner: Box<dyn CommandRunner>) -> Self {
        let handle = RepositoryHandle::new(
            project.git_dir.clone(),
            project.specs_root.clone(),
            project.index_file.clone(),
        );
        let paths = SpecPaths::new(project.root_path.clone(), project.specs_prefix());

        Self {
            handle,
            paths,
            project_root: project.root_path.clone(),
            ignore_file: project.ignore_file.clone(),
            binary: project.config.git.binary.clone(),
            runner,
        }
    }

    /// The addressing parameters this facade was built with
    pub fn handle(&self) -> &RepositoryHandle {
        &self.handle
    }

    /// The path translator this facade uses
    pub fn paths(&self) -> &SpecPaths {
        &self.paths
    }

    /// Run git with the hidden-repository addressing environment.
    ///
    /// The worktree is the working directory so relative pathspecs always
    /// resolve against the worktree root, never the cwd of the caller.
    fn git(&self, args: &[String]) -> GitResult<CommandOutput> {
        let cwd = if self.handle.work_tree.is_dir() {
            &self.handle.work_tree
        } else {
            &self.project_root
        };
        self.runner
            .run(&self.binary, args, &self.handle.env(), cwd)
            .map_err(GitError::Io)
    }

    /// Run git and fail with the binary's stderr on non-zero exit
    fn git_ok(&self, verb: &str, args: &[String]) -> GitResult<CommandOutput> {
        let output = self.git(args)?;
        if !output.success() {
            return Err(GitError::tool(verb, output.stderr.trim()));
        }
        Ok(output)
    }

    fn ensure_initialized(&self) -> GitResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(GitError::NotInitialized)
        }
    }

    /// Minimal structural check: the bare directory exists and holds an
    /// object store. Not a full integrity check.
    pub fn is_initialized(&self) -> bool {
        self.handle.git_dir.is_dir() && self.handle.git_dir.join("objects").is_dir()
    }

    /// Create the hidden repository. Idempotent: a no-op when already
    /// initialized.
    pub fn initialize(&self) -> GitResult<()> {
        if self.is_initialized() {
            tracing::debug!("spec repository already initialized");
            return Ok(());
        }

        std::fs::create_dir_all(&self.handle.git_dir)?;
        std::fs::create_dir_all(&self.handle.work_tree)?;
        probe_writable(&self.handle.git_dir)?;
        probe_writable(&self.handle.work_tree)?;

        // init is the one verb that must not see the worktree redirect:
        // --bare and GIT_WORK_TREE are mutually exclusive. The bare
        // directory is addressed explicitly as an argument instead.
        let init_args = vec![
            "init".to_string(),
            "--bare".to_string(),
            self.handle.git_dir.display().to_string(),
        ];
        let output = self
            .runner
            .run(&self.binary, &init_args, &[], &self.project_root)
            .map_err(GitError::Io)?;
        if !output.success() {
            return Err(GitError::tool("init", output.stderr.trim()));
        }

        // The hidden repository commits under its own identity so a
        // missing global git config cannot break it
        self.git_ok(
            "config",
            &["config".to_string(), "user.name".to_string(), "specgit".to_string()],
        )?;
        self.git_ok(
            "config",
            &[
                "config".to_string(),
                "user.email".to_string(),
                "specgit@localhost".to_string(),
            ],
        )?;

        if !self.ignore_file.exists() {
            std::fs::write(&self.ignore_file, DEFAULT_SPECIGNORE)?;
        }
        self.sync_excludes()?;

        tracing::info!(git_dir = %self.handle.git_dir.display(), "initialized spec repository");
        Ok(())
    }

    /// Mirror `.specignore` into the hidden repository's own exclude file
    fn sync_excludes(&self) -> GitResult<()> {
        let info_dir = self.handle.git_dir.join("info");
        std::fs::create_dir_all(&info_dir)?;
        let contents = match std::fs::read_to_string(&self.ignore_file) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        std::fs::write(info_dir.join("exclude"), contents)?;
        Ok(())
    }

    /// Stage paths in the hidden repository.
    ///
    /// Paths are filtered through the ignore engine, translated to their
    /// worktree-relative form, and added with `--force`: the primary
    /// repository's ignore rules are irrelevant here and must not skip
    /// files. Returns the worktree-relative paths actually staged.
    pub fn add<P: AsRef<Path>>(
        &self,
        paths: &[P],
        ignore: &IgnoreService,
    ) -> GitResult<Vec<String>> {
        self.ensure_initialized()?;
        self.sync_excludes()?;

        let staged: Vec<String> = paths
            .iter()
            .map(|p| self.paths.to_worktree_path(p))
            .filter(|p| !p.is_empty() && !ignore.should_ignore(p))
            .collect();

        if staged.is_empty() {
            tracing::debug!("nothing to stage after ignore filtering");
            return Ok(staged);
        }

        let mut args = vec!["add".to_string(), "--force".to_string(), "--".to_string()];
        args.extend(staged.iter().cloned());
        self.git_ok("add", &args)?;

        Ok(staged)
    }

    /// Commit staged changes and return the resulting revision id.
    ///
    /// A failure to read the id back after a successful commit is
    /// non-fatal: the commit itself already landed.
    pub fn commit(&self, message: &str) -> GitResult<Option<CommitId>> {
        self.ensure_initialized()?;

        self.git_ok(
            "commit",
            &["commit".to_string(), "-m".to_string(), message.to_string()],
        )?;

        match self.git(&["rev-parse".to_string(), "HEAD".to_string()]) {
            Ok(out) if out.success() => Ok(Some(CommitId::new(out.stdout.trim()))),
            Ok(out) => {
                tracing::warn!(stderr = %out.stderr.trim(), "commit succeeded but revision id could not be read");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "commit succeeded but revision id could not be read");
                Ok(None)
            }
        }
    }

    /// Commit history, optionally filtered to translated paths
    pub fn log<P: AsRef<Path>>(&self, paths: &[P]) -> GitResult<String> {
        self.ensure_initialized()?;
        let mut args = vec!["log".to_string(), "--oneline".to_string()];
        self.push_path_filter(&mut args, paths);
        Ok(self.git_ok("log", &args)?.stdout)
    }

    /// Unstaged changes, optionally filtered to translated paths
    pub fn diff<P: AsRef<Path>>(&self, paths: &[P]) -> GitResult<String> {
        self.ensure_initialized()?;
        let mut args = vec!["diff".to_string()];
        self.push_path_filter(&mut args, paths);
        Ok(self.git_ok("diff", &args)?.stdout)
    }

    fn push_path_filter<P: AsRef<Path>>(&self, args: &mut Vec<String>, paths: &[P]) {
        if !paths.is_empty() {
            args.push("--".to_string());
            args.extend(paths.iter().map(|p| self.paths.to_worktree_path(p)));
        }
    }

    /// Working-tree status, bucketed into staged / modified / untracked.
    /// Paths are reported in their `.specs/`-prefixed form.
    pub fn status(&self) -> GitResult<GitStatus> {
        self.ensure_initialized()?;
        // --untracked-files=all: new documentation directories must show
        // their files, not a collapsed directory entry
        let output = self.git_ok(
            "status",
            &[
                "status".to_string(),
                "--porcelain".to_string(),
                "--untracked-files=all".to_string(),
            ],
        )?;

        let mut status = GitStatus::default();
        for line in output.stdout.lines() {
            if line.len() < 3 {
                continue;
            }
            let index = line.chars().next().unwrap_or(' ');
            let worktree = line.chars().nth(1).unwrap_or(' ');
            let raw_path = &line[3..];
            // Renames report "old -> new"; the new name is the live one
            let raw_path = raw_path.rsplit(" -> ").next().unwrap_or(raw_path);
            let display = self.paths.from_worktree_path(raw_path).as_str().to_string();

            if index == '?' && worktree == '?' {
                status.untracked.push(display);
                continue;
            }
            if index != ' ' && index != '?' {
                status.staged.push(display.clone());
            }
            if worktree != ' ' && worktree != '?' {
                status.modified.push(display);
            }
        }

        Ok(status)
    }

    /// Diagnostic snapshot. Never fails: internal errors are captured in
    /// the `error` field, since this is a read-only status query.
    pub fn repository_info(&self) -> RepositoryInfo {
        let mut error = None;

        let mut exists = |path: &Path| match path.try_exists() {
            Ok(found) => found,
            Err(e) => {
                error.get_or_insert_with(|| format!("{}: {}", path.display(), e));
                false
            }
        };

        let git_dir_exists = exists(&self.handle.git_dir);
        let work_tree_exists = exists(&self.handle.work_tree);
        let index_exists = exists(&self.handle.index_file);

        RepositoryInfo {
            initialized: self.is_initialized(),
            git_dir: self.handle.git_dir.clone(),
            work_tree: self.handle.work_tree.clone(),
            index_file: self.handle.index_file.clone(),
            git_dir_exists,
            work_tree_exists,
            index_exists,
            error,
        }
    }
}

/// Proactive permission probe: a failed write later would be harder to
/// diagnose than an eager check here
fn probe_writable(dir: &Path) -> GitResult<()> {
    let probe = dir.join(".specgit-probe");
    match std::fs::write(&probe, b"") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(GitError::PermissionDenied(dir.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Seed contents for a fresh `.specignore`
const DEFAULT_SPECIGNORE: &str = "\
# Ignore rules for the hidden spec repository (gitignore syntax).
# Lines starting with ! negate an earlier match.
*.backup
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::services::runner::RecordedCall;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Runner that records calls and replays scripted outputs
    struct FakeRunner {
        calls: Arc<Mutex<Vec<RecordedCall>>>,
        outputs: Mutex<VecDeque<CommandOutput>>,
    }

    impl FakeRunner {
        fn new(calls: Arc<Mutex<Vec<RecordedCall>>>) -> Self {
            Self {
                calls,
                outputs: Mutex::new(VecDeque::new()),
            }
        }

        fn script(self, outputs: Vec<CommandOutput>) -> Self {
            *self.outputs.lock().unwrap() = outputs.into();
            self
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            program: &str,
            args: &[String],
            envs: &[(String, String)],
            cwd: &Path,
        ) -> std::io::Result<CommandOutput> {
            self.calls.lock().unwrap().push(RecordedCall {
                program: program.to_string(),
                args: args.to_vec(),
                envs: envs.to_vec(),
                cwd: cwd.to_path_buf(),
            });
            Ok(self.outputs.lock().unwrap().pop_front().unwrap_or(CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: 0,
            }))
        }
    }

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    fn fake_project(temp: &TempDir) -> Project {
        Project::new(temp.path().to_path_buf(), ProjectConfig::default())
    }

    /// Lay down the structural marker so ensure_initialized passes
    fn mark_initialized(project: &Project) {
        std::fs::create_dir_all(project.git_dir.join("objects")).unwrap();
        std::fs::create_dir_all(&project.specs_root).unwrap();
    }

    fn empty_ignore(temp: &TempDir) -> IgnoreService {
        IgnoreService::load(temp.path().join(".specignore"))
    }

    #[test]
    fn test_add_translates_and_forces() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        mark_initialized(&project);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let git = SpecGit::with_runner(&project, Box::new(FakeRunner::new(calls.clone())));
        let ignore = empty_ignore(&temp);

        let staged = git
            .add(&[".specs/src/models/index.md", "src/models/history.md"], &ignore)
            .unwrap();
        assert_eq!(staged, vec!["src/models/index.md", "src/models/history.md"]);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.args[0], "add");
        assert_eq!(call.args[1], "--force");
        // No argument carries the worktree prefix
        assert!(call.args.iter().all(|a| !a.starts_with(".specs/")));
        assert!(call.args.contains(&"src/models/index.md".to_string()));
    }

    #[test]
    fn test_every_call_carries_addressing_env() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        mark_initialized(&project);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let git = SpecGit::with_runner(&project, Box::new(FakeRunner::new(calls.clone())));
        let ignore = empty_ignore(&temp);

        git.add(&["a.md"], &ignore).unwrap();
        git.status().unwrap();
        git.log::<&str>(&[]).unwrap();

        for call in calls.lock().unwrap().iter() {
            let keys: Vec<&str> = call.envs.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE"]);
        }
    }

    #[test]
    fn test_add_filters_ignored_paths() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        mark_initialized(&project);
        std::fs::write(&project.ignore_file, "*.tmp\n").unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let git = SpecGit::with_runner(&project, Box::new(FakeRunner::new(calls.clone())));
        let ignore = IgnoreService::load(project.ignore_file.clone());

        let staged = git.add(&["keep.md", "scratch.tmp"], &ignore).unwrap();
        assert_eq!(staged, vec!["keep.md"]);
    }

    #[test]
    fn test_add_requires_initialization() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let git = SpecGit::with_runner(&project, Box::new(FakeRunner::new(calls.clone())));
        let ignore = empty_ignore(&temp);

        let err = git.add(&["a.md"], &ignore).unwrap_err();
        assert!(matches!(err, GitError::NotInitialized));
        // Nothing reached the external binary
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_commit_returns_revision_id() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        mark_initialized(&project);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = FakeRunner::new(calls.clone())
            .script(vec![ok(""), ok("0123456789abcdef0123456789abcdef01234567\n")]);
        let git = SpecGit::with_runner(&project, Box::new(runner));

        let id = git.commit("update docs").unwrap().unwrap();
        assert_eq!(id.short(), "0123456");
    }

    #[test]
    fn test_commit_survives_missing_revision_id() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        mark_initialized(&project);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = FakeRunner::new(calls.clone()).script(vec![
            ok(""),
            CommandOutput {
                stdout: String::new(),
                stderr: "fatal: bad revision".to_string(),
                exit_code: 128,
            },
        ]);
        let git = SpecGit::with_runner(&project, Box::new(runner));

        // The commit itself succeeded, so this is not an error
        assert!(git.commit("update docs").unwrap().is_none());
    }

    #[test]
    fn test_tool_failure_carries_stderr() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        mark_initialized(&project);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = FakeRunner::new(calls.clone()).script(vec![CommandOutput {
            stdout: String::new(),
            stderr: "fatal: pathspec did not match".to_string(),
            exit_code: 1,
        }]);
        let git = SpecGit::with_runner(&project, Box::new(runner));
        let ignore = empty_ignore(&temp);

        let err = git.add(&["missing.md"], &ignore).unwrap_err();
        match err {
            GitError::Tool { command, stderr } => {
                assert_eq!(command, "add");
                assert!(stderr.contains("pathspec"));
            }
            other => panic!("expected Tool error, got {other:?}"),
        }
    }

    #[test]
    fn test_status_buckets_porcelain() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        mark_initialized(&project);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = FakeRunner::new(calls.clone()).script(vec![ok(
            "A  src/models/index.md\n M src/models/history.md\n?? src/api/index.md\n",
        )]);
        let git = SpecGit::with_runner(&project, Box::new(runner));

        let status = git.status().unwrap();
        assert_eq!(status.staged, vec![".specs/src/models/index.md"]);
        assert_eq!(status.modified, vec![".specs/src/models/history.md"]);
        assert_eq!(status.untracked, vec![".specs/src/api/index.md"]);
    }

    #[test]
    fn test_repository_info_never_fails() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let git = SpecGit::with_runner(&project, Box::new(FakeRunner::new(calls)));

        let info = git.repository_info();
        assert!(!info.initialized);
        assert!(!info.git_dir_exists);
        assert!(info.error.is_none());
    }

    // Integration tests against the real git binary.

    #[test]
    fn test_initialize_with_real_git() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        let git = SpecGit::new(&project);

        assert!(!git.is_initialized());
        git.initialize().unwrap();
        assert!(git.is_initialized());
        assert!(project.git_dir.join("objects").is_dir());
        assert!(project.specs_root.is_dir());
        assert!(project.ignore_file.exists());
        assert!(project.git_dir.join("info/exclude").exists());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        let git = SpecGit::new(&project);

        git.initialize().unwrap();
        let head_before = std::fs::read_to_string(project.git_dir.join("HEAD")).unwrap();
        git.initialize().unwrap();
        let head_after = std::fs::read_to_string(project.git_dir.join("HEAD")).unwrap();
        assert_eq!(head_before, head_after);
    }

    #[test]
    fn test_add_commit_status_round_trip() {
        let temp = TempDir::new().unwrap();
        let project = fake_project(&temp);
        let git = SpecGit::new(&project);
        git.initialize().unwrap();
        let ignore = IgnoreService::load(project.ignore_file.clone());

        let doc_dir = project.specs_root.join("src/models");
        std::fs::create_dir_all(&doc_dir).unwrap();
        std::fs::write(doc_dir.join("index.md"), "# models\n").unwrap();

        let status = git.status().unwrap();
        assert_eq!(status.untracked, vec![".specs/src/models/index.md"]);

        git.add(&[".specs/src/models/index.md"], &ignore).unwrap();
        let id = git.commit("document src/models.py").unwrap();
        assert!(id.is_some());

        assert!(git.status().unwrap().is_clean());
        let log = git.log::<&str>(&[]).unwrap();
        assert!(log.contains("document src/models.py"));
    }
}
