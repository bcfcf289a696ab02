//! The versioned prompt store.
//!
//! Each `put` rewrites the prompt's Latest Pointer and, when the content
//! fingerprint differs from the newest snapshot, mints the next immutable
//! version plus its metadata sidecar. Write order is pointer, content file,
//! sidecar: a crash between steps leaves a snapshot without a sidecar (or a
//! pointer ahead of the snapshots), never a sidecar without content.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use parolo_core::clock::now_local_iso;
use parolo_core::{ContentStats, ParoloError, Result, VersionId, fingerprint, fs};
use tracing::{debug, info, warn};

use crate::extract::{NoExtractor, VariableExtractor};
use crate::layout::{Layout, scan_versions, validate_name};
use crate::locks::NameLocks;
use crate::types::{ChangeToken, CustomMetadata, PutOutcome, VersionEntry, VersionMeta};

/// Store construction parameters.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Store root. Made absolute on construction.
    pub base_dir: PathBuf,
}

impl StoreConfig {
    /// Config rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

/// Filesystem-backed store of named, versioned prompts.
///
/// Cheap to share behind an `Arc`. All methods take `&self`.
pub struct PromptStore {
    base_dir: RwLock<PathBuf>,
    locks: NameLocks,
    extractor: Arc<dyn VariableExtractor>,
}

impl std::fmt::Debug for PromptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptStore")
            .field("base_dir", &*self.base_dir.read())
            .field("extracts_variables", &self.extractor.is_available())
            .finish_non_exhaustive()
    }
}

impl PromptStore {
    /// Open a store at `config.base_dir`. Nothing is created until the
    /// first write.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            base_dir: RwLock::new(absolute(config.base_dir)),
            locks: NameLocks::new(),
            extractor: Arc::new(NoExtractor),
        }
    }

    /// Record referenced template variables with `extractor` on every new
    /// version.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn VariableExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Current store root.
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.read().clone()
    }

    /// Point the store at a different root. Affects subsequent operations
    /// only.
    pub fn set_base_dir(&self, base_dir: impl Into<PathBuf>) {
        let base_dir = absolute(base_dir.into());
        debug!(base_dir = %base_dir.display(), "store root changed");
        *self.base_dir.write() = base_dir;
    }

    /// Whether new versions record their referenced variables.
    pub fn extracts_variables(&self) -> bool {
        self.extractor.is_available()
    }

    pub(crate) fn layout(&self) -> Layout {
        Layout::new(self.base_dir())
    }

    // ── writes ──────────────────────────────────────────────────────

    /// Save `text` as the prompt's current content.
    ///
    /// Mints a new version only when `text` differs from the newest
    /// snapshot; otherwise returns that snapshot's id with `created: false`.
    /// `metadata` is stored on the new version and ignored on a no-op.
    pub fn put(
        &self,
        name: &str,
        text: &str,
        metadata: Option<CustomMetadata>,
    ) -> Result<PutOutcome> {
        self.put_with(name, text, |_| metadata.unwrap_or_default())
    }

    /// [`put`](Self::put) with metadata built from the number of existing
    /// versions.
    ///
    /// `metadata` runs while the name lock is held, so concurrent writers
    /// of one prompt each see a distinct count. It runs on a no-op too.
    pub fn put_with<F>(&self, name: &str, text: &str, metadata: F) -> Result<PutOutcome>
    where
        F: FnOnce(usize) -> CustomMetadata,
    {
        validate_name(name)?;
        let layout = self.layout();
        let lock = self.locks.for_dir(&layout.prompt_dir(name));
        let _guard = lock.lock();

        let stats = ContentStats::of(text);
        let existing = scan_versions(&layout.versions_dir(name))?;
        let custom = metadata(existing.len());
        let last = existing.last().copied();
        let previous_hash = match last {
            Some(id) => Some(self.stored_hash(&layout, name, id)?),
            None => None,
        };

        let _ = fs::write_atomic_stamped(&layout.latest_path(name), text)?;

        if let Some(id) = last {
            if previous_hash.as_deref() == Some(stats.hash.as_str()) {
                debug!(prompt = name, version = %id, "content unchanged, no new version");
                return Ok(outcome(id, stats, false));
            }
        }

        let id = last.map_or(VersionId::FIRST, VersionId::next);
        fs::write_atomic(&layout.content_path(name, id), text)?;

        let referenced_variables = if self.extractor.is_available() {
            self.extractor.extract(text)
        } else {
            None
        };
        let meta = VersionMeta {
            version: id.to_string(),
            hash: stats.hash.clone(),
            timestamp: now_local_iso(),
            size: stats.size,
            line_count: stats.lines,
            previous_hash,
            metadata: custom,
            referenced_variables,
        };
        let encoded = serde_json::to_string_pretty(&meta)?;
        fs::write_atomic(&layout.metadata_path(name, id), &encoded)?;

        info!(
            prompt = name,
            version = %id,
            hash = %short_hash(&stats.hash),
            size = stats.size,
            "minted new version"
        );
        Ok(outcome(id, stats, true))
    }

    /// Fingerprint of an existing version: from its sidecar when that is
    /// readable, otherwise recomputed from the content file.
    fn stored_hash(&self, layout: &Layout, name: &str, id: VersionId) -> Result<String> {
        if let Some(meta) = self.meta_or_warn(layout, name, id) {
            if !meta.hash.is_empty() {
                return Ok(meta.hash);
            }
        }
        let content = fs::read_optional(&layout.content_path(name, id))?
            .ok_or_else(|| ParoloError::version_not_found(name, id.to_string()))?;
        Ok(fingerprint(&content))
    }

    // ── reads ───────────────────────────────────────────────────────

    /// Current content of a prompt.
    pub fn get(&self, name: &str) -> Result<String> {
        validate_name(name)?;
        fs::read_optional(&self.layout().latest_path(name))?
            .ok_or_else(|| ParoloError::prompt_not_found(name))
    }

    /// Content of one version. `version` may be `v0001`, `v0001.txt`, or `1`.
    pub fn get_version(&self, name: &str, version: &str) -> Result<String> {
        validate_name(name)?;
        let id: VersionId = version.parse()?;
        fs::read_optional(&self.layout().content_path(name, id))?
            .ok_or_else(|| ParoloError::version_not_found(name, id.to_string()))
    }

    /// Metadata of one version, or `None` when the version, its sidecar, or
    /// the selector itself is missing or unreadable.
    pub fn meta_version(&self, name: &str, version: &str) -> Option<VersionMeta> {
        validate_name(name).ok()?;
        let id: VersionId = version.parse().ok()?;
        self.meta_or_warn(&self.layout(), name, id)
    }

    /// Newest version id, or `None` if the prompt has no snapshots.
    pub fn latest_version(&self, name: &str) -> Result<Option<VersionId>> {
        validate_name(name)?;
        Ok(scan_versions(&self.layout().versions_dir(name))?.last().copied())
    }

    /// Change-detection token of the prompt's Latest Pointer.
    pub fn token(&self, name: &str) -> Result<ChangeToken> {
        validate_name(name)?;
        Ok(fs::modified_time(&self.layout().latest_path(name))?
            .map_or(ChangeToken::ABSENT, ChangeToken::from_system_time))
    }

    // ── listings ────────────────────────────────────────────────────

    /// Content file names of every version, ascending. Empty if the prompt
    /// does not exist.
    pub fn list_versions(&self, name: &str) -> Result<Vec<String>> {
        validate_name(name)?;
        Ok(scan_versions(&self.layout().versions_dir(name))?
            .into_iter()
            .map(VersionId::content_file_name)
            .collect())
    }

    /// Every version with its metadata, ascending. Versions whose sidecar is
    /// missing or corrupt are still listed, with empty metadata fields.
    pub fn list_versions_with_meta(&self, name: &str) -> Result<Vec<VersionEntry>> {
        validate_name(name)?;
        let layout = self.layout();
        Ok(scan_versions(&layout.versions_dir(name))?
            .into_iter()
            .map(|id| VersionEntry::new(id, self.meta_or_warn(&layout, name, id)))
            .collect())
    }

    /// The `limit` most recent versions, newest first.
    pub fn history(&self, name: &str, limit: usize) -> Result<Vec<VersionEntry>> {
        let mut entries = self.list_versions_with_meta(name)?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }

    // ── metadata records ────────────────────────────────────────────

    pub(crate) fn meta_or_warn(
        &self,
        layout: &Layout,
        name: &str,
        id: VersionId,
    ) -> Option<VersionMeta> {
        match read_meta(&layout.metadata_path(name, id)) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(prompt = name, version = %id, error = %e, "unreadable version metadata");
                None
            }
        }
    }
}

fn read_meta(path: &Path) -> Result<Option<VersionMeta>> {
    let Some(raw) = fs::read_optional(path)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| ParoloError::MetadataCorrupt {
            path: path.to_path_buf(),
            source,
        })
}

fn outcome(version: VersionId, stats: ContentStats, created: bool) -> PutOutcome {
    PutOutcome {
        version,
        hash: stats.hash,
        size: stats.size,
        lines: stats.lines,
        created,
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
