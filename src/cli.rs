//! Command-line interface for specgit.
//!
//! A thin layer over the library: each subcommand wires the project
//! context into the relevant service and prints human-readable output.

use crate::config::ProjectConfig;
use crate::domain::{ConflictStrategy, Project, SpecPaths};
use crate::error::Result;
use crate::services::{
    ConflictPrompter, GenAction, GenerateOptions, Generator, IgnoreService, SpecGit,
    StdinPrompter, StrategyPrompter,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition
#[derive(Parser, Debug)]
#[command(
    name = "specgit",
    version,
    about = "Hidden version-control history for generated spec documentation",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create the hidden spec repository (.spec/, .specs/, .specignore)
    Init,
    /// Stage documentation files in the hidden repository
    Add {
        /// Paths to stage (project-relative or .specs/-prefixed)
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Commit staged documentation changes
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },
    /// Show commit history, optionally limited to paths
    Log { paths: Vec<String> },
    /// Show unstaged changes, optionally limited to paths
    Diff { paths: Vec<String> },
    /// Show staged / modified / untracked documentation files
    Status,
    /// Show diagnostic information about the hidden repository
    Info,
    /// Generate spec documents for source files
    Gen {
        /// Source files to document
        #[arg(required = true)]
        paths: Vec<String>,
        /// Template name for the generated documents
        #[arg(long)]
        template: Option<String>,
        /// What to do when generated files already exist
        #[arg(long, value_enum)]
        conflict_strategy: Option<ConflictStrategy>,
        /// Report what would happen without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Overwrite existing files without prompting
        #[arg(long)]
        force: bool,
    },
}

/// Execute a parsed command against the discovered project
pub fn run(cli: Cli) -> Result<()> {
    let root = Project::discover(None)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let config = ProjectConfig::load(Some(&root))?;
    let project = Project::new(root, config);

    match cli.cmd {
        Cmd::Init => cmd_init(&project),
        Cmd::Add { paths } => cmd_add(&project, &paths),
        Cmd::Commit { message } => cmd_commit(&project, &message),
        Cmd::Log { paths } => cmd_log(&project, &paths),
        Cmd::Diff { paths } => cmd_diff(&project, &paths),
        Cmd::Status => cmd_status(&project),
        Cmd::Info => cmd_info(&project),
        Cmd::Gen {
            paths,
            template,
            conflict_strategy,
            dry_run,
            force,
        } => cmd_gen(&project, &paths, template, conflict_strategy, dry_run, force),
    }
}

fn cmd_init(project: &Project) -> Result<()> {
    let git = SpecGit::new(project);
    if git.is_initialized() {
        println!("Spec repository already initialized");
        return Ok(());
    }
    git.initialize()?;
    println!(
        "Initialized spec repository in {}",
        project.git_dir.display()
    );
    Ok(())
}

fn cmd_add(project: &Project, paths: &[String]) -> Result<()> {
    let git = SpecGit::new(project);
    let ignore = IgnoreService::load(project.ignore_file.clone());
    let staged = git.add(paths, &ignore)?;
    if staged.is_empty() {
        println!("Nothing to stage");
    } else {
        println!("Staged {} file(s)", staged.len());
    }
    Ok(())
}

fn cmd_commit(project: &Project, message: &str) -> Result<()> {
    let git = SpecGit::new(project);
    match git.commit(message)? {
        Some(id) => println!("Committed {}", id.short()),
        None => println!("Committed (revision id unavailable)"),
    }
    Ok(())
}

fn cmd_log(project: &Project, paths: &[String]) -> Result<()> {
    let git = SpecGit::new(project);
    print!("{}", git.log(paths)?);
    Ok(())
}

fn cmd_diff(project: &Project, paths: &[String]) -> Result<()> {
    let git = SpecGit::new(project);
    print!("{}", git.diff(paths)?);
    Ok(())
}

fn cmd_status(project: &Project) -> Result<()> {
    let git = SpecGit::new(project);
    let status = git.status()?;

    if status.is_clean() {
        println!("Nothing to commit, spec worktree clean");
        return Ok(());
    }
    for (label, bucket) in [
        ("Staged", &status.staged),
        ("Modified", &status.modified),
        ("Untracked", &status.untracked),
    ] {
        if !bucket.is_empty() {
            println!("{}:", label);
            for path in bucket {
                println!("  {}", path);
            }
        }
    }
    Ok(())
}

fn cmd_info(project: &Project) -> Result<()> {
    let git = SpecGit::new(project);
    println!("{}", git.repository_info());
    Ok(())
}

fn cmd_gen(
    project: &Project,
    paths: &[String],
    template: Option<String>,
    strategy: Option<ConflictStrategy>,
    dry_run: bool,
    force: bool,
) -> Result<()> {
    let ignore = IgnoreService::load(project.ignore_file.clone());
    let translator = SpecPaths::new(project.root_path.clone(), project.specs_prefix());

    let strategy =
        strategy.or_else(|| ConflictStrategy::from_config(&project.config.generate.conflict_strategy));
    let prompter: Box<dyn ConflictPrompter> = match strategy {
        Some(s) => Box::new(StrategyPrompter(s)),
        None => Box::new(StdinPrompter),
    };

    let options = GenerateOptions {
        template: template.unwrap_or_else(|| project.config.generate.template.clone()),
        strategy,
        dry_run,
        force,
    };

    let generator = Generator::new(&translator, &ignore, prompter, options);
    let entries = generator.generate(paths)?;

    for entry in &entries {
        match entry.decision {
            GenAction::Ignored => println!("{}: {}", entry.source, entry.decision),
            _ => println!("{} -> {}/ ({})", entry.source, entry.spec_dir, entry.decision),
        }
    }
    if dry_run {
        println!("Dry run: no files were written");
    }
    Ok(())
}
