//! On-disk layout of the store.
//!
//! ```text
//! <base>/
//!   <name>/
//!     latest.txt
//!     versions/
//!       v0001.txt
//!       v0001.json
//! ```

use std::path::{Path, PathBuf};

use parolo_core::constants::{LATEST_FILENAME, VERSIONS_DIRNAME};
use parolo_core::{ParoloError, Result, VersionId};

/// Path arithmetic over a fixed store root.
#[derive(Clone, Debug)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    /// Layout rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Store root.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding one prompt.
    pub fn prompt_dir(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }

    /// The prompt's Latest Pointer.
    pub fn latest_path(&self, name: &str) -> PathBuf {
        self.prompt_dir(name).join(LATEST_FILENAME)
    }

    /// The prompt's snapshot directory.
    pub fn versions_dir(&self, name: &str) -> PathBuf {
        self.prompt_dir(name).join(VERSIONS_DIRNAME)
    }

    /// Content file of one version.
    pub fn content_path(&self, name: &str, id: VersionId) -> PathBuf {
        self.versions_dir(name).join(id.content_file_name())
    }

    /// Metadata sidecar of one version.
    pub fn metadata_path(&self, name: &str, id: VersionId) -> PathBuf {
        self.versions_dir(name).join(id.metadata_file_name())
    }
}

/// Reject names that are not a single, ordinary path component.
pub fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(ParoloError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Version ids present in `dir`, ascending.
///
/// Only content files matching `v<digits>.txt` count; sidecars and stray
/// files are ignored. A missing directory yields an empty list.
pub fn scan_versions(dir: &Path) -> Result<Vec<VersionId>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ParoloError::io(dir, e)),
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ParoloError::io(dir, e))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(id) = VersionId::from_content_file_name(file_name) {
            ids.push(id);
        }
    }
    ids.sort_unstable();
    Ok(ids)
}
