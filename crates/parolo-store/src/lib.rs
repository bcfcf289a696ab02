//! # parolo-store
//!
//! Filesystem store of named prompts with immutable, hash-chained version
//! snapshots.
//!
//! - [`PromptStore`]: put, read, list, and change tokens
//! - [`VersionMeta`]: the per-version sidecar record
//! - [`VariableExtractor`]: hook for recording referenced template variables
//!
//! The store does not interpret prompt content. Rendering lives in
//! `parolo-render`.

#![deny(unsafe_code)]

pub mod catalog;
pub mod extract;
pub mod layout;
pub mod locks;
pub mod store;
pub mod types;

pub use extract::{NoExtractor, VariableExtractor};
pub use store::{PromptStore, StoreConfig};
pub use types::{
    ChangeToken, CustomMetadata, LatestSummary, PromptSummary, PutOutcome, VersionEntry,
    VersionMeta,
};
