//! Namespaced prompt API with strict template rendering.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use parolo_core::Result;
use parolo_render::{RenderContext, TemplateEngine};
use parolo_store::{
    ChangeToken, CustomMetadata, PromptStore, PromptSummary, PutOutcome, VersionEntry,
    VersionMeta,
};

/// Namespaced view over a shared store.
///
/// Rendering is strict: a template that references a variable missing from
/// the supplied context fails with
/// [`ParoloError::UndefinedVariable`](parolo_core::ParoloError::UndefinedVariable).
#[derive(Clone, Debug)]
pub struct Prompts {
    store: Arc<PromptStore>,
    engine: Arc<TemplateEngine>,
}

impl Prompts {
    /// View over `store`, rendering with `engine`.
    pub fn new(store: Arc<PromptStore>, engine: Arc<TemplateEngine>) -> Self {
        Self { store, engine }
    }

    /// Current store root.
    pub fn base_dir(&self) -> PathBuf {
        self.store.base_dir()
    }

    /// Point the shared store at a different root.
    pub fn set_base_dir(&self, base_dir: impl Into<PathBuf>) {
        self.store.set_base_dir(base_dir);
    }

    /// Save `text` under `name`, minting a version if the content changed.
    pub fn save(
        &self,
        name: &str,
        text: &str,
        metadata: Option<CustomMetadata>,
    ) -> Result<PutOutcome> {
        self.store.put(name, text, metadata)
    }

    /// Current text.
    pub fn read(&self, name: &str) -> Result<String> {
        self.store.get(name)
    }

    /// Text of one version.
    pub fn read_version(&self, name: &str, version: &str) -> Result<String> {
        self.store.get_version(name, version)
    }

    /// Every prompt, sorted by name.
    pub fn list(&self) -> Result<Vec<PromptSummary>> {
        self.store.list_all()
    }

    /// Every prompt with details of its newest version.
    pub fn list_with_meta(&self) -> Result<Vec<PromptSummary>> {
        self.store.list_all_with_meta()
    }

    /// Version file names, ascending.
    pub fn versions(&self, name: &str) -> Result<Vec<String>> {
        self.store.list_versions(name)
    }

    /// Versions with metadata, ascending.
    pub fn versions_with_meta(&self, name: &str) -> Result<Vec<VersionEntry>> {
        self.store.list_versions_with_meta(name)
    }

    /// The `limit` newest versions, newest first.
    pub fn history(&self, name: &str, limit: usize) -> Result<Vec<VersionEntry>> {
        self.store.history(name, limit)
    }

    /// Metadata of one version, if readable.
    pub fn meta(&self, name: &str, version: &str) -> Option<VersionMeta> {
        self.store.meta_version(name, version)
    }

    /// Change-detection token.
    pub fn token(&self, name: &str) -> Result<ChangeToken> {
        self.store.token(name)
    }

    /// Version count per prompt.
    pub fn overview(&self) -> Result<BTreeMap<String, usize>> {
        self.store.overview()
    }

    /// Current text as a reusable template.
    pub fn template(&self, name: &str) -> Result<PromptTemplate> {
        PromptTemplate::new(self.store.get(name)?, self.engine.clone())
    }

    /// Render the current text against `vars`.
    pub fn render(&self, name: &str, vars: &RenderContext) -> Result<String> {
        self.engine.render_str(&self.store.get(name)?, vars)
    }

    /// Render one version against `vars`.
    pub fn render_version(&self, name: &str, version: &str, vars: &RenderContext) -> Result<String> {
        self.engine
            .render_str(&self.store.get_version(name, version)?, vars)
    }

    /// Variables the current text references, sorted. Empty when the engine
    /// is unavailable or the text is not a valid template.
    pub fn vars(&self, name: &str) -> Result<Vec<String>> {
        let source = self.store.get(name)?;
        Ok(self.engine.extract_variables(&source).into_iter().collect())
    }
}

/// A snapshot of a prompt's text, validated as a template.
///
/// Later saves do not affect an existing `PromptTemplate`.
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    source: String,
    engine: Arc<TemplateEngine>,
}

impl PromptTemplate {
    fn new(source: String, engine: Arc<TemplateEngine>) -> Result<Self> {
        let _ = engine.compile(&source)?;
        Ok(Self { source, engine })
    }

    /// Template source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render against `vars`.
    pub fn render(&self, vars: &RenderContext) -> Result<String> {
        self.engine.render_str(&self.source, vars)
    }

    /// Referenced variables, sorted.
    pub fn variables(&self) -> Vec<String> {
        self.engine
            .extract_variables(&self.source)
            .into_iter()
            .collect()
    }
}
