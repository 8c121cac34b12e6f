#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions, // StatusError, StatusKey read better than Error, Key
    clippy::missing_errors_doc,      // every error is a StatusError, documented there
    clippy::missing_panics_doc,      // same
)]

pub mod error;
pub mod format;
pub mod identity;
pub mod root;
pub mod runner;
pub mod status;

use std::path::PathBuf;

use error::StatusError;
use identity::Identity;
use runner::CommandRunner;
use status::WorkspaceStatus;

/// Where to look and what to ask. Built by the CLI from flags and env vars.
#[derive(Debug, Clone)]
pub struct Options {
    /// Path the ascending search starts from (file or directory).
    pub start: PathBuf,
    /// File whose presence marks the workspace root.
    pub marker: String,
    /// Tag glob handed to `git describe --match`.
    pub describe_match: String,
}

impl Options {
    #[must_use]
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            start: start.into(),
            marker: root::DEFAULT_MARKER.into(),
            describe_match: status::DEFAULT_DESCRIBE_MATCH.into(),
        }
    }
}

/// The single public API: find the root → ask git → stamp the builder.
pub fn run(options: &Options, runner: &dyn CommandRunner) -> Result<WorkspaceStatus, StatusError> {
    run_as(options, runner, Identity::detect)
}

/// [`run`] with the identity lookup supplied by the caller. It still runs
/// after root discovery, so a missing workspace is reported first.
pub fn run_as(
    options: &Options,
    runner: &dyn CommandRunner,
    identity: impl FnOnce() -> Result<Identity, StatusError>,
) -> Result<WorkspaceStatus, StatusError> {
    let root = root::find_root(&options.start, &options.marker)?;
    let identity = identity()?;
    WorkspaceStatus::collect(&root, runner, &options.describe_match, &identity)
}
