use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use workspace_status::error::StatusError;
use workspace_status::runner::GitRunner;
use workspace_status::{Options, format, root, status};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("WORKSPACE_STATUS_BUILD_DESCRIBE"),
    ")"
);

/// Print STABLE_* stamps for Bazel's --workspace_status_command.
/// Finds the workspace root above this executable, asks git for the commit
/// and describe string, and prints them with the builder's user@host:root.
#[derive(Parser)]
#[command(name = "workspace-status", version = VERSION, about)]
struct Cli {
    /// Start the root search here instead of at the executable's location.
    #[arg(long, env = "WORKSPACE_STATUS_START", value_name = "PATH")]
    start: Option<PathBuf>,

    /// File that marks the workspace root.
    #[arg(long, env = "WORKSPACE_STATUS_MARKER", default_value = root::DEFAULT_MARKER)]
    marker: String,

    /// git executable to run.
    #[arg(long, env = "WORKSPACE_STATUS_GIT", value_name = "PROGRAM", default_value = "git")]
    git: PathBuf,

    /// Tag pattern for `git describe --match`.
    #[arg(
        long = "match",
        env = "WORKSPACE_STATUS_MATCH",
        value_name = "PATTERN",
        default_value = status::DEFAULT_DESCRIBE_MATCH
    )]
    describe_match: String,

    /// Print a JSON object instead of KEY VALUE lines.
    #[arg(long)]
    json: bool,

    /// Print shell completions for the given shell.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "workspace-status", &mut io::stdout());
        return;
    }

    init_logging();

    if let Err(e) = report(&cli) {
        tracing::debug!(exit_code = e.exit_code(), error = ?e, "workspace status failed");
        eprintln!("workspace-status: {e}");
        process::exit(e.exit_code());
    }
}

/// Compute everything, then write it in one go. Nothing reaches stdout
/// unless all three values were resolved.
fn report(cli: &Cli) -> Result<(), StatusError> {
    let options = Options {
        start: start_path(cli.start.clone())?,
        marker: cli.marker.clone(),
        describe_match: cli.describe_match.clone(),
    };
    let runner = GitRunner::new(cli.git.as_os_str());

    let status = workspace_status::run(&options, &runner)?;
    tracing::debug!(root = %status.root.display(), "status collected");

    let output = if cli.json {
        format::json(&status.entries())
    } else {
        format::lines(&status.entries())
    };

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|source| StatusError::Environment {
            what: "stdout",
            reason: source.to_string(),
        })
}

/// Explicit `--start`, else the path this program was invoked as (Bazel
/// runs it from inside the workspace, e.g. `tools/workspace-status`, often a
/// symlink into `bazel-bin`). `current_exe()` would resolve that link, so it
/// is only used when `argv[0]` is a bare name found through `PATH`.
fn start_path(explicit: Option<PathBuf>) -> Result<PathBuf, StatusError> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let invoked = std::env::args_os().next().map(PathBuf::from);
    if let Some(path) = invoked.filter(|p| p.components().count() > 1) {
        tracing::debug!(start = %path.display(), "starting from argv[0]");
        return Ok(path);
    }

    std::env::current_exe().map_err(|source| StatusError::InvalidStart {
        path: PathBuf::from("<current executable>"),
        source,
    })
}

/// Logs go to stderr only; stdout is parsed by the build system.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        // Fall back to `warn` if RUST_LOG is unset or invalid
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .try_init();
}
