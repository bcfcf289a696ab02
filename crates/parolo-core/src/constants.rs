//! On-disk layout constants.
//!
//! ```text
//! <base_dir>/<name>/latest.txt
//! <base_dir>/<name>/versions/v0001.txt
//! <base_dir>/<name>/versions/v0001.json
//! ```

/// File holding the Latest Pointer of a prompt.
pub const LATEST_FILENAME: &str = "latest.txt";

/// Directory (inside a prompt namespace) holding immutable snapshots.
pub const VERSIONS_DIRNAME: &str = "versions";

/// Fixed one-letter prefix of every version id.
pub const VERSION_PREFIX: char = 'v';

/// Minimum digit count of a formatted version id. Wider ids are not truncated.
pub const VERSION_DIGITS: usize = 4;

/// Extension of version content files.
pub const CONTENT_EXT: &str = "txt";

/// Extension of version metadata sidecars.
pub const METADATA_EXT: &str = "json";

/// Selector accepted by legacy readers to mean "the Latest Pointer".
pub const LATEST_SELECTOR: &str = "latest";

/// Environment variable overriding the store base directory.
pub const HOME_ENV_VAR: &str = "PAROLO_HOME";

/// Home-relative directory for settings and the default store root.
pub const PAROLO_DIRNAME: &str = ".parolo";

/// Default store root under [`PAROLO_DIRNAME`].
pub const PROMPTS_DIRNAME: &str = "prompts";
