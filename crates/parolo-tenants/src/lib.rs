//! # parolo-tenants
//!
//! Multi-tenant naming over the Parolo store. A (tenant, agent) pair owns
//! one prompt; versions carry a caller-facing semver tag in their metadata.

#![deny(unsafe_code)]

pub mod cache;
pub mod tenants;

pub use cache::TokenCache;
pub use tenants::{DEFAULT_SEMVER_BASE, INITIAL_SEMVER, SaveInfo, TenantPrompts, key};
