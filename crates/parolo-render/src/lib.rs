//! # parolo-render
//!
//! Turning stored prompt text into final strings:
//!
//! - [`TemplateEngine`]: strict Jinja rendering (feature `jinja`, on by
//!   default) and referenced-variable extraction
//! - [`legacy::format`]: `{name}` placeholder substitution

#![deny(unsafe_code)]

pub mod engine;
pub mod legacy;

pub use engine::{CompiledTemplate, RenderContext, TemplateEngine};
