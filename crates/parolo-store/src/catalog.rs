//! Store-wide listings.

use std::collections::BTreeMap;
use std::path::Path;

use parolo_core::constants::LATEST_FILENAME;
use parolo_core::{ParoloError, Result};
use tracing::debug;

use crate::layout::scan_versions;
use crate::store::PromptStore;
use crate::types::{LatestSummary, PromptSummary};

impl PromptStore {
    /// Version count of every prompt that has a snapshot directory.
    ///
    /// Empty when the store root does not exist.
    pub fn overview(&self) -> Result<BTreeMap<String, usize>> {
        let layout = self.layout();
        let mut counts = BTreeMap::new();
        for name in prompt_dirs(layout.base())? {
            let versions_dir = layout.versions_dir(&name);
            if versions_dir.is_dir() {
                let count = scan_versions(&versions_dir)?.len();
                let _ = counts.insert(name, count);
            }
        }
        Ok(counts)
    }

    /// Every prompt directory in the store, sorted by name.
    pub fn list_all(&self) -> Result<Vec<PromptSummary>> {
        self.summaries(false)
    }

    /// Like [`list_all`](Self::list_all), with details of each prompt's
    /// newest version.
    pub fn list_all_with_meta(&self) -> Result<Vec<PromptSummary>> {
        self.summaries(true)
    }

    fn summaries(&self, with_meta: bool) -> Result<Vec<PromptSummary>> {
        let layout = self.layout();
        let mut out = Vec::new();
        for name in prompt_dirs(layout.base())? {
            let versions = scan_versions(&layout.versions_dir(&name))?;
            let latest = match versions.last() {
                Some(&id) if with_meta => {
                    let meta = self.meta_or_warn(&layout, &name, id);
                    Some(LatestSummary {
                        latest_version: id,
                        hash: meta.as_ref().map(|m| m.hash.clone()),
                        timestamp: meta.as_ref().map(|m| m.timestamp.clone()),
                        size: meta.as_ref().map(|m| m.size),
                        line_count: meta.as_ref().map(|m| m.line_count),
                    })
                }
                _ => None,
            };
            out.push(PromptSummary {
                has_latest: layout.prompt_dir(&name).join(LATEST_FILENAME).is_file(),
                versions: versions.len(),
                name,
                latest,
            });
        }
        Ok(out)
    }
}

/// Names of the subdirectories of `base`, sorted.
fn prompt_dirs(base: &Path) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(base = %base.display(), "store root missing, nothing to list");
            return Ok(Vec::new());
        }
        Err(e) => return Err(ParoloError::io(base, e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ParoloError::io(base, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => debug!(?raw, "skipping non UTF-8 directory"),
        }
    }
    names.sort();
    Ok(names)
}
