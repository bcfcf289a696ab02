//! Version ids.
//!
//! A [`VersionId`] is a 1-based sequence number rendered as the fixed prefix
//! `v` plus at least four zero-padded digits (`v0001`). Ids beyond 9999 widen
//! (`v10000`) instead of wrapping. Ordering is numeric.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{CONTENT_EXT, METADATA_EXT, VERSION_DIGITS, VERSION_PREFIX};
use crate::errors::ParoloError;

/// Sequence number of an immutable version snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId(u32);

impl VersionId {
    /// The first version of every prompt.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw index. Returns `None` for zero.
    #[must_use]
    pub fn new(index: u32) -> Option<Self> {
        (index > 0).then_some(Self(index))
    }

    /// The raw 1-based index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }

    /// The id following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Content file name (`v0001.txt`).
    #[must_use]
    pub fn content_file_name(self) -> String {
        format!("{self}.{CONTENT_EXT}")
    }

    /// Metadata sidecar file name (`v0001.json`).
    #[must_use]
    pub fn metadata_file_name(self) -> String {
        format!("{self}.{METADATA_EXT}")
    }

    /// Parse a version content file name (`v0001.txt`).
    ///
    /// Returns `None` for anything else, including metadata sidecars.
    pub fn from_content_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(&format!(".{CONTENT_EXT}"))?;
        let digits = stem.strip_prefix(VERSION_PREFIX)?;
        parse_digits(digits)
    }
}

fn parse_digits(digits: &str) -> Option<VersionId> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().and_then(VersionId::new)
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{VERSION_PREFIX}{:0width$}", self.0, width = VERSION_DIGITS)
    }
}

impl FromStr for VersionId {
    type Err = ParoloError;

    /// Accepts `v0001`, `v0001.txt`, `v0001.json`, `v1`, or a bare `1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let stem = trimmed
            .strip_suffix(&format!(".{CONTENT_EXT}"))
            .or_else(|| trimmed.strip_suffix(&format!(".{METADATA_EXT}")))
            .unwrap_or(trimmed);
        let digits = stem.strip_prefix(VERSION_PREFIX).unwrap_or(stem);
        parse_digits(digits).ok_or_else(|| ParoloError::InvalidVersion(s.to_owned()))
    }
}

impl Serialize for VersionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
