//! Strict template engine.
//!
//! Templates use Jinja syntax. Every referenced variable must be supplied:
//! an undefined variable is an error, never an empty string. Block
//! whitespace handling follows [`TemplateSettings`].

use std::collections::BTreeSet;

use parolo_core::{ParoloError, Result};
use parolo_settings::TemplateSettings;
use parolo_store::VariableExtractor;
use serde_json::{Map, Value};

/// Variables supplied to a render.
pub type RenderContext = Map<String, Value>;

/// Strict Jinja renderer.
///
/// Built without the `jinja` feature, every render fails with
/// [`ParoloError::EngineUnavailable`] and extraction yields nothing.
pub struct TemplateEngine {
    #[cfg(feature = "jinja")]
    env: minijinja::Environment<'static>,
    settings: TemplateSettings,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("available", &Self::AVAILABLE)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(TemplateSettings::default())
    }
}

impl TemplateEngine {
    /// Whether the engine was compiled in.
    pub const AVAILABLE: bool = cfg!(feature = "jinja");

    /// Engine with the given block whitespace options.
    pub fn new(settings: TemplateSettings) -> Self {
        Self {
            #[cfg(feature = "jinja")]
            env: strict_env(settings),
            settings,
        }
    }

    /// Options the engine was built with.
    pub fn settings(&self) -> TemplateSettings {
        self.settings
    }

    /// Check that `source` parses, returning a [`CompiledTemplate`] that can
    /// be rendered repeatedly.
    pub fn compile<'a>(&'a self, source: &'a str) -> Result<CompiledTemplate<'a>> {
        #[cfg(feature = "jinja")]
        {
            let template = self
                .env
                .template_from_str(source)
                .map_err(|e| ParoloError::Template(e.to_string()))?;
            Ok(CompiledTemplate { template })
        }
        #[cfg(not(feature = "jinja"))]
        {
            let _ = source;
            Err(ParoloError::EngineUnavailable)
        }
    }

    /// Render `source` against `vars`.
    pub fn render_str(&self, source: &str, vars: &RenderContext) -> Result<String> {
        self.compile(source)?.render(vars)
    }

    /// Variables `source` references without defining, sorted. Empty when the
    /// source does not parse or the engine is unavailable.
    pub fn extract_variables(&self, source: &str) -> BTreeSet<String> {
        match self.compile(source) {
            Ok(template) => template.variables(),
            Err(e) => {
                tracing::debug!(error = %e, "variable extraction skipped");
                BTreeSet::new()
            }
        }
    }
}

impl VariableExtractor for TemplateEngine {
    fn is_available(&self) -> bool {
        Self::AVAILABLE
    }

    fn extract(&self, source: &str) -> Option<Vec<String>> {
        let template = self.compile(source).ok()?;
        Some(template.variables().into_iter().collect())
    }
}

/// A parsed template borrowed from its engine and source.
pub struct CompiledTemplate<'a> {
    #[cfg(feature = "jinja")]
    template: minijinja::Template<'a, 'a>,
    #[cfg(not(feature = "jinja"))]
    _marker: std::marker::PhantomData<&'a ()>,
}

impl std::fmt::Debug for CompiledTemplate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplate").finish_non_exhaustive()
    }
}

impl CompiledTemplate<'_> {
    /// Render against `vars`.
    ///
    /// An undefined variable yields [`ParoloError::UndefinedVariable`] naming
    /// the first referenced variable missing from `vars` (or the engine's
    /// message when the undefined value is an attribute or item).
    pub fn render(&self, vars: &RenderContext) -> Result<String> {
        #[cfg(feature = "jinja")]
        {
            self.template.render(vars).map_err(|e| {
                if e.kind() == minijinja::ErrorKind::UndefinedError {
                    let missing = self
                        .variables()
                        .into_iter()
                        .find(|name| !vars.contains_key(name));
                    ParoloError::UndefinedVariable(missing.unwrap_or_else(|| e.to_string()))
                } else {
                    ParoloError::Template(e.to_string())
                }
            })
        }
        #[cfg(not(feature = "jinja"))]
        {
            let _ = vars;
            Err(ParoloError::EngineUnavailable)
        }
    }

    /// Variables referenced without being defined in the template, sorted.
    pub fn variables(&self) -> BTreeSet<String> {
        #[cfg(feature = "jinja")]
        {
            self.template.undeclared_variables(false).into_iter().collect()
        }
        #[cfg(not(feature = "jinja"))]
        {
            BTreeSet::new()
        }
    }
}

#[cfg(feature = "jinja")]
fn strict_env(settings: TemplateSettings) -> minijinja::Environment<'static> {
    let mut env = minijinja::Environment::new();
    env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
    env.set_trim_blocks(settings.trim_blocks);
    env.set_lstrip_blocks(settings.lstrip_blocks);
    env
}
