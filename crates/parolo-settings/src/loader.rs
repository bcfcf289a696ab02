//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ParoloSettings::default()`]
//! 2. If `~/.parolo/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use parolo_core::constants::{HOME_ENV_VAR, PAROLO_DIRNAME, PROMPTS_DIRNAME};
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ParoloSettings;

/// Log level override.
pub const LOG_ENV_VAR: &str = "PAROLO_LOG";
/// `trimBlocks` override.
pub const TRIM_BLOCKS_ENV_VAR: &str = "PAROLO_TRIM_BLOCKS";
/// `lstripBlocks` override.
pub const LSTRIP_BLOCKS_ENV_VAR: &str = "PAROLO_LSTRIP_BLOCKS";

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
}

/// Resolve the path to the settings file (`~/.parolo/settings.json`).
pub fn settings_path() -> PathBuf {
    home_dir().join(PAROLO_DIRNAME).join("settings.json")
}

/// Default store root (`~/.parolo/prompts`).
pub fn default_base_dir() -> PathBuf {
    home_dir().join(PAROLO_DIRNAME).join(PROMPTS_DIRNAME)
}

/// The store root the settings point at, made absolute.
///
/// The path is not canonicalized; it need not exist yet.
pub fn resolve_base_dir(settings: &ParoloSettings) -> PathBuf {
    let raw = settings
        .base_dir
        .as_deref()
        .map_or_else(default_base_dir, PathBuf::from);
    std::path::absolute(&raw).unwrap_or(raw)
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ParoloSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ParoloSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn load_file_layer(path: &Path) -> Result<ParoloSettings> {
    let defaults = serde_json::to_value(ParoloSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment overrides read through `lookup`.
///
/// Empty values are ignored. Invalid booleans are ignored with a warning.
pub fn apply_env_overrides<F>(settings: &mut ParoloSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read_string = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let read_bool = |name: &str| {
        let val = read_string(name)?;
        let parsed = parse_bool(&val);
        if parsed.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        parsed
    };

    if let Some(v) = read_string(HOME_ENV_VAR) {
        settings.base_dir = Some(v);
    }
    if let Some(v) = read_string(LOG_ENV_VAR) {
        settings.logging.level = v;
    }
    if let Some(v) = read_bool(TRIM_BLOCKS_ENV_VAR) {
        settings.templates.trim_blocks = v;
    }
    if let Some(v) = read_bool(LSTRIP_BLOCKS_ENV_VAR) {
        settings.templates.lstrip_blocks = v;
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"templates": {"trimBlocks": true, "lstripBlocks": true}});
        let source = serde_json::json!({"templates": {"trimBlocks": false}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["templates"]["trimBlocks"], false);
        assert_eq!(merged["templates"]["lstripBlocks"], true);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4]));
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings = load_file_layer(Path::new("/nonexistent/settings.json")).unwrap();
        assert!(settings.base_dir.is_none());
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"baseDir": "/srv/prompts", "history": {"defaultLimit": 3}}"#,
        )
        .unwrap();

        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.base_dir.as_deref(), Some("/srv/prompts"));
        assert_eq!(settings.history.default_limit, 3);
        assert!(settings.templates.trim_blocks);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        assert_matches!(load_file_layer(&path), Err(SettingsError::Json(_)));
    }

    // ── env overrides ───────────────────────────────────────────────

    #[test]
    fn env_overrides_apply() {
        let mut settings = ParoloSettings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                ("PAROLO_HOME", "/data/prompts"),
                ("PAROLO_LOG", "debug"),
                ("PAROLO_TRIM_BLOCKS", "off"),
            ]),
        );
        assert_eq!(settings.base_dir.as_deref(), Some("/data/prompts"));
        assert_eq!(settings.logging.level, "debug");
        assert!(!settings.templates.trim_blocks);
        assert!(settings.templates.lstrip_blocks);
    }

    #[test]
    fn env_overrides_ignore_empty_and_invalid() {
        let mut settings = ParoloSettings {
            base_dir: Some("/from/file".into()),
            ..ParoloSettings::default()
        };
        apply_env_overrides(
            &mut settings,
            env(&[("PAROLO_HOME", ""), ("PAROLO_LSTRIP_BLOCKS", "maybe")]),
        );
        assert_eq!(settings.base_dir.as_deref(), Some("/from/file"));
        assert!(settings.templates.lstrip_blocks);
    }

    // ── base dir resolution ─────────────────────────────────────────

    #[test]
    fn resolve_base_dir_defaults_under_home() {
        let resolved = resolve_base_dir(&ParoloSettings::default());
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(".parolo/prompts"));
    }

    #[test]
    fn resolve_base_dir_makes_relative_absolute() {
        let settings = ParoloSettings {
            base_dir: Some("project-prompts".into()),
            ..ParoloSettings::default()
        };
        let resolved = resolve_base_dir(&settings);
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("project-prompts"));
    }

    // ── parse_bool ──────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for val in &["true", "1", "yes", "on", "TRUE", "Yes"] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
        for val in &["false", "0", "no", "off", "OFF"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }
}
