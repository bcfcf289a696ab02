//! Human-readable renderings of version records.

use std::fmt::Write;

use parolo_core::clock::display_timestamp;
use parolo_store::{VersionEntry, VersionMeta};

const SHORT_HASH_LEN: usize = 8;

fn short(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}

/// One line per version: `- v0001.txt (2025-01-01 10:00:00) [1a2b3c4d]`.
pub fn version_list(entries: &[VersionEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        match (&entry.timestamp, &entry.hash) {
            (Some(ts), Some(hash)) => {
                let _ = writeln!(
                    out,
                    "- {} ({}) [{}]",
                    entry.file,
                    display_timestamp(ts),
                    short(hash)
                );
            }
            _ => {
                let _ = writeln!(out, "- {} [no metadata]", entry.file);
            }
        }
    }
    out
}

/// Full description of one version.
pub fn version_info(name: &str, version: &str, meta: &VersionMeta) -> String {
    let mut out = format!("Version info for {name} {version}:\n");
    let _ = writeln!(out, "  Hash: {}", meta.hash);
    let _ = writeln!(out, "  Timestamp: {}", meta.timestamp);
    let _ = writeln!(out, "  Size: {} bytes", meta.size);
    let _ = writeln!(out, "  Lines: {}", meta.line_count);
    if let Some(prev) = &meta.previous_hash {
        let _ = writeln!(out, "  Previous hash: {prev}");
    }
    if let Some(vars) = &meta.referenced_variables {
        let _ = writeln!(out, "  Variables: {}", vars.join(", "));
    }
    if !meta.metadata.is_empty() {
        let custom = serde_json::Value::Object(meta.metadata.clone());
        let _ = writeln!(out, "  Custom metadata: {custom}");
    }
    out
}

/// Log-style history block, one paragraph per version.
pub fn history(name: &str, entries: &[VersionEntry]) -> String {
    let mut out = format!("Version history for '{name}':\n");
    for entry in entries {
        let (Some(hash), Some(ts)) = (&entry.hash, &entry.timestamp) else {
            let _ = writeln!(out, "\n{} [no metadata]", entry.file);
            continue;
        };
        let _ = writeln!(out, "\nVersion: {}", entry.version);
        let _ = writeln!(out, "Hash: {}", short(hash));
        let _ = writeln!(out, "Date: {}", display_timestamp(ts));
        let _ = writeln!(
            out,
            "Size: {} bytes, {} lines",
            entry.size.unwrap_or_default(),
            entry.line_count.unwrap_or_default()
        );
        if let Some(custom) = entry.metadata.as_ref().filter(|m| !m.is_empty()) {
            let _ = writeln!(out, "Metadata: {}", serde_json::Value::Object(custom.clone()));
        }
    }
    out
}
