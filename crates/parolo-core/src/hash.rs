//! Content fingerprints.
//!
//! SHA-256 over the UTF-8 bytes, lowercase hex. Used for change detection and
//! the previous-hash chain only.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `text`.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derived facts about a piece of content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentStats {
    /// Hex SHA-256 fingerprint.
    pub hash: String,
    /// UTF-8 byte length.
    pub size: u64,
    /// Number of newline-delimited lines.
    pub lines: u64,
}

impl ContentStats {
    /// Compute stats for `text`.
    pub fn of(text: &str) -> Self {
        Self {
            hash: fingerprint(text),
            size: text.len() as u64,
            lines: text.lines().count() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn deterministic_and_sensitive() {
        assert_eq!(fingerprint("A"), fingerprint("A"));
        assert_ne!(fingerprint("A"), fingerprint("A "));
        assert_eq!(fingerprint("A").len(), 64);
    }

    #[test]
    fn stats_count_utf8_bytes() {
        let stats = ContentStats::of("héllo");
        assert_eq!(stats.size, 6);
        assert_eq!(stats.lines, 1);
    }

    #[test]
    fn stats_line_counting() {
        assert_eq!(ContentStats::of("").lines, 0);
        assert_eq!(ContentStats::of("one").lines, 1);
        assert_eq!(ContentStats::of("one\n").lines, 1);
        assert_eq!(ContentStats::of("one\ntwo").lines, 2);
        assert_eq!(ContentStats::of("one\r\ntwo\n\n").lines, 3);
    }
}
