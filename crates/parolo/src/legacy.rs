//! Legacy prompt API.
//!
//! Same store as [`Prompts`](crate::Prompts), different defaults: versions
//! are selected with the literal `"latest"` or a version id, and text is
//! filled with `{name}` placeholders instead of a template engine.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use parolo_core::Result;
use parolo_core::constants::LATEST_SELECTOR;
use parolo_render::legacy;
use parolo_store::{CustomMetadata, PromptStore, PutOutcome, VersionEntry, VersionMeta};
use serde_json::{Map, Value};

/// Legacy view over a shared store.
#[derive(Clone, Debug)]
pub struct Prompt {
    store: Arc<PromptStore>,
}

impl Prompt {
    /// View over `store`.
    pub fn new(store: Arc<PromptStore>) -> Self {
        Self { store }
    }

    /// Current store root.
    pub fn base_dir(&self) -> PathBuf {
        self.store.base_dir()
    }

    /// Point the shared store at a different root.
    pub fn set_base_dir(&self, base_dir: impl Into<PathBuf>) {
        self.store.set_base_dir(base_dir);
    }

    /// Save `text` under `name`.
    pub fn create(
        &self,
        name: &str,
        text: &str,
        metadata: Option<CustomMetadata>,
    ) -> Result<PutOutcome> {
        self.store.put(name, text, metadata)
    }

    /// Version file names, ascending. Empty for an unknown prompt.
    pub fn list_versions(&self, name: &str) -> Result<Vec<String>> {
        self.store.list_versions(name)
    }

    /// Versions with metadata, ascending.
    pub fn list_versions_with_meta(&self, name: &str) -> Result<Vec<VersionEntry>> {
        self.store.list_versions_with_meta(name)
    }

    /// Metadata of one version (`v0001` or `v0001.txt`), if readable.
    pub fn get_metadata(&self, name: &str, version: &str) -> Option<VersionMeta> {
        self.store.meta_version(name, version)
    }

    /// Metadata for display. See [`display::version_info`](crate::display::version_info).
    pub fn version_info(&self, name: &str, version: &str) -> Option<VersionMeta> {
        self.get_metadata(name, version)
    }

    /// The `limit` newest versions, newest first.
    pub fn log(&self, name: &str, limit: usize) -> Result<Vec<VersionEntry>> {
        self.store.history(name, limit)
    }

    /// Text of `version`, or the current text for `"latest"`.
    pub fn get_prompt(&self, name: &str, version: &str) -> Result<String> {
        if version == LATEST_SELECTOR {
            self.store.get(name)
        } else {
            self.store.get_version(name, version)
        }
    }

    /// [`get_prompt`](Self::get_prompt) with `{name}` placeholders filled
    /// from `vars`. With no variables the text is returned as stored.
    pub fn format_prompt(
        &self,
        name: &str,
        version: &str,
        vars: &Map<String, Value>,
    ) -> Result<String> {
        legacy::format(&self.get_prompt(name, version)?, vars)
    }

    /// `{name}` placeholders of [`get_prompt`](Self::get_prompt), in order of
    /// first appearance.
    pub fn fields(&self, name: &str, version: &str) -> Result<Vec<String>> {
        Ok(legacy::fields(&self.get_prompt(name, version)?))
    }

    /// Version count per prompt.
    pub fn overview(&self) -> Result<BTreeMap<String, usize>> {
        self.store.overview()
    }
}
