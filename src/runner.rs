use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::StatusError;

/// Runs a source-control command and hands back its stdout.
///
/// The seam between status collection and the outside world: production
/// code uses [`GitRunner`], tests script the answers.
pub trait CommandRunner {
    /// Run with `args` in `cwd`. Non-zero exit is an error carrying the
    /// tool's stderr; stdout must be UTF-8.
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String, StatusError>;
}

/// Invokes the `git` binary (or whatever `program` points at).
#[derive(Debug, Clone)]
pub struct GitRunner {
    program: OsString,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitRunner {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn display(&self, args: &[&str]) -> String {
        let mut command = self.program.to_string_lossy().into_owned();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        command
    }
}

impl CommandRunner for GitRunner {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String, StatusError> {
        let command = self.display(args);
        tracing::debug!(%command, cwd = %cwd.display(), "running");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| StatusError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        if !output.status.success() {
            return Err(StatusError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| StatusError::InvalidOutput {
            command,
            reason: format!("stdout is not UTF-8 ({e})"),
        })
    }
}
