//! # parolo
//!
//! Versioned prompt store with strict template rendering.
//!
//! A [`Parolo`] handle owns one [`PromptStore`] and hands out views over it:
//!
//! - [`Prompts`]: the namespaced API (save/read/render with strict Jinja)
//! - [`Prompt`]: the legacy API (`{name}` formatting, `"latest"` selector)
//! - [`TenantPrompts`]: tenant/agent keyed prompts with semver tags
//!
//! Every view shares the store, so a root change through one is seen by all.

#![deny(unsafe_code)]

pub mod display;
pub mod legacy;
pub mod prompts;

use std::path::PathBuf;
use std::sync::Arc;

pub use legacy::Prompt;
pub use parolo_core::{ContentStats, ErrorKind, ParoloError, Result, VersionId, fingerprint};
pub use parolo_render::{RenderContext, TemplateEngine};
pub use parolo_settings::{ParoloSettings, TemplateSettings};
pub use parolo_store::{
    ChangeToken, CustomMetadata, PromptStore, PromptSummary, PutOutcome, StoreConfig,
    VersionEntry, VersionMeta,
};
pub use parolo_tenants::{SaveInfo, TenantPrompts, key as tenant_key};
pub use prompts::{PromptTemplate, Prompts};

/// Shared store plus template engine.
#[derive(Clone, Debug)]
pub struct Parolo {
    store: Arc<PromptStore>,
    engine: Arc<TemplateEngine>,
}

impl Parolo {
    /// Open a store rooted at `base_dir` with default template options.
    pub fn open(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_options(base_dir, TemplateSettings::default())
    }

    /// Open a store rooted at `base_dir` with the given template options.
    pub fn with_options(base_dir: impl Into<PathBuf>, templates: TemplateSettings) -> Self {
        let engine = Arc::new(TemplateEngine::new(templates));
        let store = PromptStore::new(StoreConfig::new(base_dir)).with_extractor(engine.clone());
        Self {
            store: Arc::new(store),
            engine,
        }
    }

    /// Open the store the settings point at.
    pub fn from_settings(settings: &ParoloSettings) -> Self {
        let base_dir = parolo_settings::resolve_base_dir(settings);
        tracing::debug!(
            base_dir = %base_dir.display(),
            jinja = TemplateEngine::AVAILABLE,
            "opening prompt store from settings"
        );
        Self::with_options(base_dir, settings.templates)
    }

    /// Open the store named by the process-wide settings
    /// (`~/.parolo/settings.json` and `PAROLO_*` variables).
    pub fn from_env() -> Self {
        Self::from_settings(parolo_settings::get_settings())
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<PromptStore> {
        &self.store
    }

    /// The shared template engine.
    pub fn engine(&self) -> &Arc<TemplateEngine> {
        &self.engine
    }

    /// Namespaced view.
    pub fn prompts(&self) -> Prompts {
        Prompts::new(self.store.clone(), self.engine.clone())
    }

    /// Legacy view.
    pub fn legacy(&self) -> Prompt {
        Prompt::new(self.store.clone())
    }

    /// Tenant view. Each call starts with an empty read cache.
    pub fn tenants(&self) -> TenantPrompts {
        TenantPrompts::new(self.store.clone())
    }

    /// Redirect every view to a different store root.
    pub fn set_base_dir(&self, base_dir: impl Into<PathBuf>) {
        self.store.set_base_dir(base_dir);
    }
}
