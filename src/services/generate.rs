//! Documentation generation with conflict resolution.
//!
//! Each source file gets a documentation directory under the worktree
//! holding an index document and a history document. Pre-existing
//! generated files are reconciled per a caller-selected strategy or by
//! prompting; an abort unwinds the entire batch immediately.

use crate::domain::{ConflictDecision, ConflictStrategy, ExistingDoc, SpecPaths};
use crate::error::{GenError, GenResult};
use crate::services::ignore::IgnoreService;
use crate::services::template;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// File name of the generated index document
pub const INDEX_DOC: &str = "index.md";
/// File name of the generated history document
pub const HISTORY_DOC: &str = "history.md";

/// Capability supplied by the caller to decide conflicts.
///
/// Keeps the resolver's decision logic pure and testable independent of
/// terminal I/O.
pub trait ConflictPrompter {
    /// Decide what to do about the given pre-existing files
    fn decide(&self, existing: &[ExistingDoc]) -> ConflictDecision;
}

/// Constant-returning prompter backed by a configured strategy
pub struct StrategyPrompter(pub ConflictStrategy);

impl ConflictPrompter for StrategyPrompter {
    fn decide(&self, _existing: &[ExistingDoc]) -> ConflictDecision {
        self.0.decision()
    }
}

/// Interactive prompter reading decisions from stdin
pub struct StdinPrompter;

impl ConflictPrompter for StdinPrompter {
    fn decide(&self, existing: &[ExistingDoc]) -> ConflictDecision {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stderr();
        prompt_decision(&mut input, &mut output, existing)
    }
}

/// Prompt loop over explicit streams; invalid input re-prompts, EOF and
/// `q` both mean abort.
fn prompt_decision(
    input: &mut impl BufRead,
    output: &mut impl Write,
    existing: &[ExistingDoc],
) -> ConflictDecision {
    let _ = writeln!(output, "Generated files already exist:");
    for doc in existing {
        let modified = doc
            .modified
            .map(|t| {
                chrono::DateTime::<chrono::Local>::from(t)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "unknown".to_string());
        let _ = writeln!(
            output,
            "  {} ({} bytes, modified {})",
            doc.path.display(),
            doc.size,
            modified
        );
    }

    loop {
        let _ = write!(output, "[o]verwrite, [b]ackup, [s]kip, [q]uit? ");
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            // End-of-input is an abort request, not a crash
            Ok(0) | Err(_) => return ConflictDecision::Abort,
            Ok(_) => {}
        }

        match line.trim().to_lowercase().as_str() {
            "o" | "overwrite" => return ConflictDecision::Overwrite,
            "b" | "backup" => return ConflictDecision::Backup,
            "s" | "skip" => return ConflictDecision::Skip,
            "q" | "quit" => return ConflictDecision::Abort,
            other => {
                let _ = writeln!(output, "Unrecognized choice: {:?}", other);
            }
        }
    }
}

/// Options controlling one generation run
pub struct GenerateOptions {
    pub template: String,
    pub strategy: Option<ConflictStrategy>,
    pub dry_run: bool,
    pub force: bool,
}

/// What happened for one source file
#[derive(Debug, Clone)]
pub struct GenEntry {
    pub source: String,
    pub spec_dir: String,
    pub decision: GenAction,
}

/// Per-source outcome of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenAction {
    /// Documents were written (or would be, under --dry-run)
    Generated,
    /// Existing documents were backed up first
    GeneratedWithBackup,
    /// Left untouched per the skip decision
    Skipped,
    /// Excluded by an ignore rule
    Ignored,
}

impl std::fmt::Display for GenAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Generated => "generated",
            Self::GeneratedWithBackup => "generated (backup taken)",
            Self::Skipped => "skipped",
            Self::Ignored => "ignored",
        };
        write!(f, "{}", s)
    }
}

/// Generation workflow over a batch of source files
pub struct Generator<'a> {
    paths: &'a SpecPaths,
    ignore: &'a IgnoreService,
    prompter: Box<dyn ConflictPrompter + 'a>,
    options: GenerateOptions,
}

impl<'a> Generator<'a> {
    /// Build a generator; the prompter is only consulted when no strategy
    /// is configured and `--force` is off
    pub fn new(
        paths: &'a SpecPaths,
        ignore: &'a IgnoreService,
        prompter: Box<dyn ConflictPrompter + 'a>,
        options: GenerateOptions,
    ) -> Self {
        Self {
            paths,
            ignore,
            prompter,
            options,
        }
    }

    /// Generate documentation for each source path, sequentially.
    ///
    /// An abort decision unwinds the whole batch: remaining sources are
    /// not touched.
    pub fn generate<P: AsRef<Path>>(&self, sources: &[P]) -> GenResult<Vec<GenEntry>> {
        let mut entries = Vec::new();

        for source in sources {
            let project_path = self.paths.ensure_within_project_root(source)?;
            let source_display = project_path.as_str().to_string();

            if self.ignore.should_ignore(project_path.as_path()) {
                tracing::debug!(source = %source_display, "source excluded by ignore rules");
                entries.push(GenEntry {
                    source: source_display,
                    spec_dir: String::new(),
                    decision: GenAction::Ignored,
                });
                continue;
            }

            let spec_dir = self.paths.spec_dir_for_source(project_path.as_path())?;
            let abs_dir = self.paths.to_absolute_specs_path(spec_dir.as_str());

            let decision = self.resolve(&abs_dir);
            tracing::debug!(dir = %spec_dir, %decision, "conflict resolution");

            let action = match decision {
                ConflictDecision::Abort => return Err(GenError::Aborted),
                ConflictDecision::Skip => GenAction::Skipped,
                ConflictDecision::Backup => {
                    if !self.options.dry_run {
                        backup_existing(&abs_dir)?;
                        self.write_documents(&abs_dir, &source_display)?;
                    }
                    GenAction::GeneratedWithBackup
                }
                ConflictDecision::Proceed | ConflictDecision::Overwrite => {
                    if !self.options.dry_run {
                        self.write_documents(&abs_dir, &source_display)?;
                    }
                    GenAction::Generated
                }
            };

            entries.push(GenEntry {
                source: source_display,
                spec_dir: spec_dir.as_str().to_string(),
                decision: action,
            });
        }

        Ok(entries)
    }

    /// Decide what to do about one documentation directory
    fn resolve(&self, dir: &Path) -> ConflictDecision {
        let existing = existing_docs(dir);
        if existing.is_empty() {
            return ConflictDecision::Proceed;
        }
        if self.options.force {
            return ConflictDecision::Overwrite;
        }
        match self.options.strategy {
            Some(strategy) => strategy.decision(),
            None => self.prompter.decide(&existing),
        }
    }

    fn write_documents(&self, dir: &Path, source: &str) -> GenResult<()> {
        std::fs::create_dir_all(dir)?;

        let date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let vars = [("source", source), ("date", date.as_str())];
        let (index_tpl, history_tpl) = template::templates_for(&self.options.template);

        std::fs::write(dir.join(INDEX_DOC), template::render(index_tpl, &vars))?;
        std::fs::write(dir.join(HISTORY_DOC), template::render(history_tpl, &vars))?;
        Ok(())
    }
}

/// Inspect a documentation directory for the two well-known generated files
fn existing_docs(dir: &Path) -> Vec<ExistingDoc> {
    [INDEX_DOC, HISTORY_DOC]
        .iter()
        .filter_map(|name| ExistingDoc::inspect(dir.join(name)))
        .collect()
}

/// Copy each existing generated file aside with a timestamp suffix.
///
/// Any copy failure aborts the whole operation: partial backups are not
/// acceptable.
fn backup_existing(dir: &Path) -> GenResult<Vec<PathBuf>> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut created = Vec::new();

    for doc in existing_docs(dir) {
        let file_name = doc
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let backup_path = dir.join(format!("{}.{}.backup", file_name, stamp));
        std::fs::copy(&doc.path, &backup_path).map_err(|source| GenError::Backup {
            path: doc.path.clone(),
            source,
        })?;
        // The backup keeps the original's modification time, so it still
        // tells the truth about when its content was last written
        if let Some(mtime) = doc.modified {
            std::fs::OpenOptions::new()
                .write(true)
                .open(&backup_path)
                .and_then(|f| f.set_modified(mtime))
                .map_err(|source| GenError::Backup {
                    path: doc.path.clone(),
                    source,
                })?;
        }
        created.push(backup_path);
    }

    Ok(created)
}
