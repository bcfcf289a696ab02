//! Per-prompt write locks.
//!
//! Writers to the same prompt directory are serialized; writers to
//! different prompts proceed in parallel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

/// Lazily created mutex per prompt directory.
#[derive(Debug, Default)]
pub struct NameLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl NameLocks {
    /// Empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `prompt_dir`, created on first use.
    pub fn for_dir(&self, prompt_dir: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(prompt_dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
