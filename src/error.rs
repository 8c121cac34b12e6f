use std::path::PathBuf;

/// Every way a status run can fail. Displayed on stderr as a single line;
/// the build system discards stdout whenever the exit code is non-zero.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("no `{marker}` found in {start} or any of its parent directories")]
    WorkspaceNotFound { start: PathBuf, marker: String },

    #[error("cannot resolve start path {path}: {source}")]
    InvalidStart {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({}){}", describe_exit(.code), stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` produced unusable output: {reason}")]
    InvalidOutput { command: String, reason: String },

    #[error("cannot determine {what}: {reason}")]
    Environment { what: &'static str, reason: String },
}

impl StatusError {
    /// Process exit code for this error. A failing git propagates its own code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::WorkspaceNotFound { .. } | Self::InvalidStart { .. } => 2,
            Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound => 127,
            Self::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            Self::Spawn { .. } | Self::CommandFailed { .. } | Self::InvalidOutput { .. } => 1,
            Self::Environment { .. } => 3,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".into(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}
