use std::process::Command;

/// Stamp the binary with its own describe string, shown by `--version`.
/// Builds from a tarball (no `.git`) fall back to "unknown".
fn main() {
    let describe = Command::new("git")
        .args(["describe", "--always", "--dirty", "--match", "v[0-9].*"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=WORKSPACE_STATUS_BUILD_DESCRIBE={describe}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}
