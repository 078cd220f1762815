//! Blocking command execution behind a narrow, fakeable seam.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of one external command invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    /// True iff the command exited zero
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The only capability the git facade needs from the outside world.
///
/// Production uses [`SystemRunner`]; tests substitute a recording fake.
pub trait CommandRunner {
    /// Run a program to completion, capturing stdout/stderr/exit code
    fn run(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
        cwd: &Path,
    ) -> std::io::Result<CommandOutput>;
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
        cwd: &Path,
    ) -> std::io::Result<CommandOutput> {
        let mut command = Command::new(program);
        command.args(args).current_dir(cwd);
        for (key, value) in envs {
            command.env(key, value);
        }

        tracing::debug!(program, ?args, cwd = %cwd.display(), "running external command");

        let output = command.output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// One recorded invocation, kept by test fakes for assertions
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub cwd: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_runner_captures_output() {
        let runner = SystemRunner;
        let out = runner
            .run(
                "sh",
                &["-c".to_string(), "echo hello".to_string()],
                &[],
                Path::new("."),
            )
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_system_runner_nonzero_exit() {
        let runner = SystemRunner;
        let out = runner
            .run(
                "sh",
                &["-c".to_string(), "echo oops >&2; exit 3".to_string()],
                &[],
                Path::new("."),
            )
            .unwrap();
        assert!(!out.success());
        assert_eq!(out.exit_code, 3);
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn test_system_runner_passes_env() {
        let runner = SystemRunner;
        let out = runner
            .run(
                "sh",
                &["-c".to_string(), "printf '%s' \"$SPECGIT_PROBE\"".to_string()],
                &[("SPECGIT_PROBE".to_string(), "42".to_string())],
                Path::new("."),
            )
            .unwrap();
        assert_eq!(out.stdout, "42");
    }
}
