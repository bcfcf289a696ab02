//! Settings type definitions.
//!
//! All types use camelCase JSON keys and `#[serde(default)]`, so partial
//! files are valid: missing fields keep their defaults.

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "baseDir": "/srv/prompts",
///   "logging": { "level": "info" },
///   "templates": { "trimBlocks": false }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParoloSettings {
    /// Store root. `None` means `~/.parolo/prompts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Template engine options.
    pub templates: TemplateSettings,
    /// Version history display.
    pub history: HistorySettings,
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level for the stderr subscriber (`RUST_LOG` still wins).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Template engine options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateSettings {
    /// Remove the first newline after a block tag.
    pub trim_blocks: bool,
    /// Strip leading whitespace before a block tag.
    pub lstrip_blocks: bool,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            trim_blocks: true,
            lstrip_blocks: true,
        }
    }
}

/// Version history display.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// Entries shown by `log` when no limit is given.
    pub default_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}
