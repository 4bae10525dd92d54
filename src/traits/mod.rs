//! Trait definitions for Opsify tools.
//!
//! Each tool parameter type implements [`ToolParams`] for validation and
//! schema generation, and [`Adapter`] for the upstream mapping.

mod adapter;
mod params;

pub use adapter::{Adapter, OutputStyle};
pub use params::{JsonObject, ToolParams};

pub(crate) use params::require_non_empty;
