//! Template variable extraction hook.
//!
//! The store records which variables a version references when an extractor
//! is installed. The store itself knows nothing about template syntax.

/// Finds the variables a template source references.
pub trait VariableExtractor: Send + Sync {
    /// Whether extraction is functional in this build.
    fn is_available(&self) -> bool;

    /// Referenced variable names, sorted. `None` when the source cannot be
    /// parsed.
    fn extract(&self, source: &str) -> Option<Vec<String>>;
}

/// Extractor used when no template engine is installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExtractor;

impl VariableExtractor for NoExtractor {
    fn is_available(&self) -> bool {
        false
    }

    fn extract(&self, _source: &str) -> Option<Vec<String>> {
        None
    }
}
