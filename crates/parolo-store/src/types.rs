//! Store record and result types.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use parolo_core::VersionId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-supplied metadata attached to a version. Opaque to the store.
pub type CustomMetadata = Map<String, Value>;

/// Sidecar metadata record (`versions/vNNNN.json`).
///
/// Every field defaults when absent so partially written or hand-edited
/// records still load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionMeta {
    /// Version id as written (`v0001`).
    pub version: String,
    /// Fingerprint of the version content.
    pub hash: String,
    /// Creation time, naive local ISO-8601.
    pub timestamp: String,
    /// UTF-8 byte length of the content.
    pub size: u64,
    /// Newline-delimited line count of the content.
    pub line_count: u64,
    /// Fingerprint of the preceding version, `null` for the first.
    pub previous_hash: Option<String>,
    /// Caller-supplied metadata.
    pub metadata: CustomMetadata,
    /// Template variables referenced by the content, when extraction ran.
    #[serde(alias = "jinja_variables", skip_serializing_if = "Option::is_none")]
    pub referenced_variables: Option<Vec<String>>,
}

impl VersionMeta {
    /// Parsed version id, if the record's `version` field is well-formed.
    pub fn version_id(&self) -> Option<VersionId> {
        self.version.parse().ok()
    }

    /// A string value from the custom metadata.
    pub fn custom_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Result of [`PromptStore::put`](crate::PromptStore::put).
///
/// `hash`, `size`, and `lines` always describe the text just written, whether
/// or not a new version was minted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PutOutcome {
    /// The newly minted version, or the unchanged latest one.
    pub version: VersionId,
    /// Fingerprint of the written text.
    pub hash: String,
    /// UTF-8 byte length of the written text.
    pub size: u64,
    /// Line count of the written text.
    pub lines: u64,
    /// Whether a new version was minted.
    pub created: bool,
}

/// One version in a listing, enriched with whatever metadata is available.
///
/// Fields other than `file` and `version` are `None` when the sidecar is
/// missing or unreadable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VersionEntry {
    /// Content file name (`v0001.txt`).
    pub file: String,
    /// Version id.
    pub version: VersionId,
    /// Creation time.
    pub timestamp: Option<String>,
    /// Content fingerprint.
    pub hash: Option<String>,
    /// Content byte length.
    pub size: Option<u64>,
    /// Content line count.
    pub line_count: Option<u64>,
    /// Fingerprint of the preceding version.
    pub previous_hash: Option<String>,
    /// Template variables referenced by the content.
    pub referenced_variables: Option<Vec<String>>,
    /// Caller-supplied metadata.
    pub metadata: Option<CustomMetadata>,
}

impl VersionEntry {
    pub(crate) fn new(version: VersionId, meta: Option<VersionMeta>) -> Self {
        let file = version.content_file_name();
        match meta {
            Some(m) => Self {
                file,
                version,
                timestamp: Some(m.timestamp),
                hash: Some(m.hash),
                size: Some(m.size),
                line_count: Some(m.line_count),
                previous_hash: m.previous_hash,
                referenced_variables: m.referenced_variables,
                metadata: Some(m.metadata),
            },
            None => Self {
                file,
                version,
                timestamp: None,
                hash: None,
                size: None,
                line_count: None,
                previous_hash: None,
                referenced_variables: None,
                metadata: None,
            },
        }
    }
}

/// Per-prompt summary returned by the catalog listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PromptSummary {
    /// Prompt name.
    pub name: String,
    /// Number of version snapshots.
    pub versions: usize,
    /// Whether a Latest Pointer exists.
    pub has_latest: bool,
    /// Most recent version details (only when requested and available).
    #[serde(skip_serializing_if = "Option::is_none", flatten)]
    pub latest: Option<LatestSummary>,
}

/// Details of a prompt's most recent version.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LatestSummary {
    /// Most recent version id.
    pub latest_version: VersionId,
    /// Its fingerprint.
    pub hash: Option<String>,
    /// Its creation time.
    pub timestamp: Option<String>,
    /// Its byte length.
    pub size: Option<u64>,
    /// Its line count.
    pub line_count: Option<u64>,
}

/// Opaque change-detection token for a prompt's Latest Pointer.
///
/// Wraps the pointer's modification time in nanoseconds since the Unix
/// epoch; [`ChangeToken::ABSENT`] when the prompt has never been written.
/// Successive writes through the store yield strictly increasing tokens,
/// except on filesystems that ignore explicit mtimes or record them coarser
/// than two seconds, where two quick writes can share a token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChangeToken(u128);

impl ChangeToken {
    /// Token of a prompt with no Latest Pointer.
    pub const ABSENT: Self = Self(0);

    pub(crate) fn from_system_time(time: SystemTime) -> Self {
        time.duration_since(UNIX_EPOCH)
            .map_or(Self::ABSENT, |d| Self(d.as_nanos()))
    }

    /// Token from a raw nanosecond value.
    pub const fn from_nanos(nanos: u128) -> Self {
        Self(nanos)
    }

    /// Raw nanosecond value.
    pub fn as_nanos(self) -> u128 {
        self.0
    }

    /// Whether the prompt existed when the token was taken.
    pub fn is_present(self) -> bool {
        self != Self::ABSENT
    }
}

impl fmt::Display for ChangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
