use std::fmt::Write;

use serde::{Serialize, Serializer};

use crate::status::StatusEntry;

/// Bazel's workspace-status format: one `KEY VALUE` per line, newline-terminated.
#[must_use]
pub fn lines(entries: &[StatusEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{} {}", entry.key, entry.value);
    }
    out
}

/// Serializes as a map in entry order, so JSON keys follow `StatusKey::ALL`.
struct JsonEntries<'a>(&'a [StatusEntry]);

impl Serialize for JsonEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|e| (e.key.as_str(), &e.value)))
    }
}

/// Pretty JSON object keyed like the line format.
#[must_use]
pub fn json(entries: &[StatusEntry]) -> String {
    let mut out = serde_json::to_string_pretty(&JsonEntries(entries))
        .expect("string keys and values are always serializable");
    out.push('\n');
    out
}
