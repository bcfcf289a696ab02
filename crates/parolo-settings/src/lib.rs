//! # parolo-settings
//!
//! Configuration for the Parolo prompt store.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`ParoloSettings::default()`]
//! 2. **User file** — `~/.parolo/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `PAROLO_*` overrides (highest priority)
//!
//! The process-wide value from [`get_settings`] is read once. Stores never
//! consult it implicitly: callers resolve a base directory with
//! [`resolve_base_dir`] and hand it to the store constructor.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path, resolve_base_dir,
    settings_path,
};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<ParoloSettings> = OnceLock::new();

/// Get the process-wide settings.
///
/// The first call loads `~/.parolo/settings.json` plus env overrides; later
/// calls return the cached value. Load failures fall back to defaults.
pub fn get_settings() -> &'static ParoloSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            ParoloSettings::default()
        })
    })
}
