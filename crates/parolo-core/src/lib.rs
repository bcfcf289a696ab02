//! # parolo-core
//!
//! Foundation types and utilities shared by every Parolo crate:
//!
//! - **Errors**: [`ParoloError`] with an [`ErrorKind`] classifier
//! - **Version ids**: [`VersionId`], the `v0001`-style sequence number
//! - **Fingerprints**: [`fingerprint`] (SHA-256, hex) and [`ContentStats`]
//! - **Durable writes**: [`fs::write_atomic`] and friends (temp file + rename)
//! - **Logging**: `tracing` subscriber setup and test capture utilities

#![deny(unsafe_code)]

pub mod clock;
pub mod constants;
pub mod errors;
pub mod fs;
pub mod hash;
pub mod logging;
pub mod version;

pub use errors::{ErrorKind, ParoloError, Result};
pub use hash::{ContentStats, fingerprint};
pub use version::VersionId;
