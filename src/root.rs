use std::path::{Component, Path, PathBuf};

use crate::error::StatusError;

/// Marker whose presence identifies the workspace root.
pub const DEFAULT_MARKER: &str = "WORKSPACE";

/// Walk up from `start` to the first directory containing `marker`.
///
/// `start` may be a file (the running executable, typically); the search
/// then begins at its parent. The path is made absolute and `..` is folded
/// lexically, but symlinks are kept: a `tools/workspace-status` link into
/// `bazel-bin` still belongs to the workspace it sits in. The walk stops at
/// the file-system root and fails with [`StatusError::WorkspaceNotFound`];
/// it never loops.
///
/// Never touches the process working directory.
pub fn find_root(start: &Path, marker: &str) -> Result<PathBuf, StatusError> {
    let invalid = |source| StatusError::InvalidStart {
        path: start.to_path_buf(),
        source,
    };
    let start = absolute(start).map_err(invalid)?;
    if !start.try_exists().map_err(invalid)? {
        return Err(invalid(std::io::ErrorKind::NotFound.into()));
    }

    let first = if start.is_dir() {
        start.as_path()
    } else {
        start.parent().unwrap_or(&start)
    };

    for dir in first.ancestors() {
        if has_marker(dir, marker) {
            tracing::debug!(root = %dir.display(), "found {marker}");
            return Ok(dir.to_path_buf());
        }
    }

    Err(StatusError::WorkspaceNotFound {
        start,
        marker: marker.to_string(),
    })
}

/// Any entry counts (file, dir, symlink), not just regular files. An
/// unreadable directory is logged and skipped.
fn has_marker(dir: &Path, marker: &str) -> bool {
    match dir.join(marker).try_exists() {
        Ok(found) => {
            if !found {
                tracing::trace!(dir = %dir.display(), "no {marker} here");
            }
            found
        }
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "cannot check for {marker}, skipping");
            false
        }
    }
}

/// Absolute form of `path` without resolving symlinks, with `.` and `..`
/// folded the way a shell would print it.
fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    let path = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(dunce::simplified(&out).to_path_buf())
}
