//! Error hierarchy for the Parolo store.
//!
//! [`ParoloError`] carries the context of each failure; [`ErrorKind`] is the
//! coarse classification callers branch on. Metadata failures
//! ([`ParoloError::MetadataCorrupt`]) are produced internally and swallowed by
//! the public metadata readers, which degrade to "no metadata".

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Name or version absent on read.
    NotFound,
    /// Filesystem-level failure (write, rename, mkdir, read).
    Io,
    /// Strict render referenced a variable that was not supplied.
    UndefinedVariable,
    /// A sidecar metadata record could not be parsed.
    MetadataCorrupt,
    /// Legacy `{name}` formatting referenced a key that was not supplied.
    MissingKey,
    /// Template syntax or evaluation failure.
    Template,
    /// The template engine was not compiled in.
    EngineUnavailable,
    /// Caller supplied a malformed name or version id.
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::Io => "io",
            Self::UndefinedVariable => "undefined_variable",
            Self::MetadataCorrupt => "metadata_corrupt",
            Self::MissingKey => "missing_key",
            Self::Template => "template",
            Self::EngineUnavailable => "engine_unavailable",
            Self::InvalidInput => "invalid_input",
        };
        f.write_str(s)
    }
}

/// Errors produced by the store, renderer, and tenant layer.
#[derive(Debug, Error)]
pub enum ParoloError {
    /// A prompt (or one of its versions) does not exist.
    #[error("{}", not_found_message(name, version.as_deref()))]
    NotFound {
        /// Prompt name.
        name: String,
        /// Requested version selector, if any.
        version: Option<String>,
    },

    /// Filesystem failure at a specific path.
    #[error("I/O failure at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Strict rendering hit an undefined variable.
    #[error("undefined template variable: {0}")]
    UndefinedVariable(String),

    /// Sidecar metadata is not valid JSON for a version record.
    #[error("corrupt metadata at {}: {source}", path.display())]
    MetadataCorrupt {
        /// Path of the sidecar file.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Legacy formatting referenced a key that was not supplied.
    #[error("missing format key: {0}")]
    MissingKey(String),

    /// Template could not be compiled or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// Strict rendering requested without a template engine.
    #[error("template engine not available in this build")]
    EngineUnavailable,

    /// Prompt name is not a single path component.
    #[error("invalid prompt name: {0:?}")]
    InvalidName(String),

    /// Version selector is not of the form `v0001`, `v0001.txt`, or `1`.
    #[error("invalid version id: {0:?}")]
    InvalidVersion(String),

    /// Metadata record could not be serialized.
    #[error("failed to encode metadata: {0}")]
    Json(#[from] serde_json::Error),
}

fn not_found_message(name: &str, version: Option<&str>) -> String {
    match version {
        Some(v) => format!("prompt '{name}' version '{v}' not found"),
        None => format!("prompt '{name}' not found"),
    }
}

impl ParoloError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a not-found error for a prompt's Latest Pointer.
    pub fn prompt_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            version: None,
        }
    }

    /// Build a not-found error for a specific version.
    pub fn version_not_found(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } | Self::Json(_) => ErrorKind::Io,
            Self::UndefinedVariable(_) => ErrorKind::UndefinedVariable,
            Self::MetadataCorrupt { .. } => ErrorKind::MetadataCorrupt,
            Self::MissingKey(_) => ErrorKind::MissingKey,
            Self::Template(_) => ErrorKind::Template,
            Self::EngineUnavailable => ErrorKind::EngineUnavailable,
            Self::InvalidName(_) | Self::InvalidVersion(_) => ErrorKind::InvalidInput,
        }
    }

    /// Whether this is a [`ErrorKind::NotFound`] error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Result type for Parolo operations.
pub type Result<T> = std::result::Result<T, ParoloError>;
