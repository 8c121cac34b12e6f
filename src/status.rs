use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StatusError;
use crate::identity::Identity;
use crate::runner::CommandRunner;

/// Tags considered by `git describe`. Anything else (release branches,
/// CI bookkeeping tags) is ignored.
pub const DEFAULT_DESCRIBE_MATCH: &str = "v[0-9].*";

/// Keys this tool reports. All of them are stable: Bazel re-stamps
/// dependent outputs whenever one changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKey {
    GitCommit,
    GitVersion,
    Builder,
}

impl StatusKey {
    /// Output order. Consumers should parse by key, but some go by position.
    pub const ALL: [StatusKey; 3] = [Self::GitCommit, Self::GitVersion, Self::Builder];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitCommit => "STABLE_GIT_COMMIT",
            Self::GitVersion => "STABLE_GIT_VERSION",
            Self::Builder => "STABLE_BUILDER",
        }
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `KEY VALUE` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub key: StatusKey,
    pub value: String,
}

/// Everything one run produces. Built in full before anything is printed,
/// so a failure never leaves half a status block on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceStatus {
    pub root: PathBuf,
    pub commit: String,
    pub version: String,
    pub builder: String,
}

impl WorkspaceStatus {
    /// Query git in `root` and stamp the builder. Stops at the first failure.
    pub fn collect(
        root: &Path,
        runner: &dyn CommandRunner,
        describe_match: &str,
        identity: &Identity,
    ) -> Result<Self, StatusError> {
        let commit = query(runner, &["rev-parse", "HEAD"], root)?;
        let version = query(
            runner,
            &["describe", "--always", "--match", describe_match, "--dirty"],
            root,
        )?;
        let builder = identity.builder(root)?;

        Ok(Self {
            root: root.to_path_buf(),
            commit,
            version,
            builder,
        })
    }

    #[must_use]
    pub fn value(&self, key: StatusKey) -> &str {
        match key {
            StatusKey::GitCommit => &self.commit,
            StatusKey::GitVersion => &self.version,
            StatusKey::Builder => &self.builder,
        }
    }

    /// Entries in output order.
    #[must_use]
    pub fn entries(&self) -> Vec<StatusEntry> {
        StatusKey::ALL
            .iter()
            .map(|&key| StatusEntry {
                key,
                value: self.value(key).to_string(),
            })
            .collect()
    }
}

/// Run a git query and reduce its output to a single trimmed line.
fn query(runner: &dyn CommandRunner, args: &[&str], root: &Path) -> Result<String, StatusError> {
    let out = runner.run(args, root)?;
    let value = out.trim();

    let reason = if value.is_empty() {
        "empty output"
    } else if value.contains(['\n', '\r']) {
        "more than one line of output"
    } else {
        return Ok(value.to_string());
    };

    Err(StatusError::InvalidOutput {
        command: format!("git {}", args.join(" ")),
        reason: reason.into(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Answers queued in call order; records what was asked.
    pub(crate) struct ScriptedRunner {
        answers: RefCell<VecDeque<Result<String, StatusError>>>,
        pub(crate) calls: RefCell<Vec<(Vec<String>, PathBuf)>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new(answers: Vec<Result<String, StatusError>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, args: &[&str], cwd: &Path) -> Result<String, StatusError> {
            self.calls.borrow_mut().push((
                args.iter().map(|a| (*a).to_string()).collect(),
                cwd.to_path_buf(),
            ));
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected call: {args:?}"))
        }
    }

    const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

    fn identity() -> Identity {
        Identity::new("alice", "buildbox").unwrap()
    }

    fn failed(code: i32) -> StatusError {
        StatusError::CommandFailed {
            command: "git".into(),
            code: Some(code),
            stderr: "fatal: not a git repository".into(),
        }
    }

    #[test]
    fn collects_commit_version_and_builder() {
        let runner = ScriptedRunner::new(vec![Ok(format!("{COMMIT}\n")), Ok("v1.2.3\n".into())]);
        let root = Path::new("/work/space");

        let status =
            WorkspaceStatus::collect(root, &runner, DEFAULT_DESCRIBE_MATCH, &identity()).unwrap();

        assert_eq!(status.commit, COMMIT);
        assert_eq!(status.version, "v1.2.3");
        assert_eq!(status.builder, "alice@buildbox:/work/space");
    }

    #[test]
    fn queries_run_in_root_with_expected_arguments() {
        let runner = ScriptedRunner::new(vec![Ok(COMMIT.into()), Ok("0123456".into())]);
        let root = Path::new("/work/space");

        WorkspaceStatus::collect(root, &runner, DEFAULT_DESCRIBE_MATCH, &identity()).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                (vec!["rev-parse".to_string(), "HEAD".to_string()], root.to_path_buf()),
                (
                    ["describe", "--always", "--match", "v[0-9].*", "--dirty"]
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                    root.to_path_buf()
                ),
            ]
        );
    }

    #[test]
    fn custom_describe_pattern_is_passed_through() {
        let runner = ScriptedRunner::new(vec![Ok(COMMIT.into()), Ok("release-7".into())]);
        WorkspaceStatus::collect(Path::new("/w"), &runner, "release-*", &identity()).unwrap();

        let calls = runner.calls.borrow();
        assert!(calls[1].0.contains(&"release-*".to_string()));
    }

    #[test]
    fn commit_failure_stops_before_describe() {
        let runner = ScriptedRunner::new(vec![Err(failed(128))]);

        let err = WorkspaceStatus::collect(Path::new("/w"), &runner, DEFAULT_DESCRIBE_MATCH, &identity())
            .unwrap_err();

        assert_eq!(err.exit_code(), 128);
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn describe_failure_is_fatal() {
        let runner = ScriptedRunner::new(vec![Ok(COMMIT.into()), Err(failed(1))]);

        let err = WorkspaceStatus::collect(Path::new("/w"), &runner, DEFAULT_DESCRIBE_MATCH, &identity())
            .unwrap_err();

        assert!(matches!(err, StatusError::CommandFailed { .. }));
    }

    #[test]
    fn dirty_suffix_is_kept_verbatim() {
        let runner = ScriptedRunner::new(vec![Ok(COMMIT.into()), Ok("v1.2.3-4-g0123456-dirty\n".into())]);

        let status =
            WorkspaceStatus::collect(Path::new("/w"), &runner, DEFAULT_DESCRIBE_MATCH, &identity()).unwrap();

        assert_eq!(status.version, "v1.2.3-4-g0123456-dirty");
    }

    #[test]
    fn empty_or_multiline_output_is_rejected() {
        let runner = ScriptedRunner::new(vec![Ok("  \n".into())]);
        let err = WorkspaceStatus::collect(Path::new("/w"), &runner, DEFAULT_DESCRIBE_MATCH, &identity())
            .unwrap_err();
        assert!(matches!(err, StatusError::InvalidOutput { .. }));

        let runner = ScriptedRunner::new(vec![Ok(COMMIT.into()), Ok("v1\nv2\n".into())]);
        let err = WorkspaceStatus::collect(Path::new("/w"), &runner, DEFAULT_DESCRIBE_MATCH, &identity())
            .unwrap_err();
        assert!(matches!(err, StatusError::InvalidOutput { .. }));
    }

    #[test]
    fn entries_come_in_fixed_order() {
        let status = WorkspaceStatus {
            root: "/w".into(),
            commit: COMMIT.into(),
            version: "v1.2.3".into(),
            builder: "alice@buildbox:/w".into(),
        };

        let keys: Vec<&str> = status.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["STABLE_GIT_COMMIT", "STABLE_GIT_VERSION", "STABLE_BUILDER"]);
        assert!(keys.iter().all(|k| k.starts_with("STABLE_")));
    }
}
